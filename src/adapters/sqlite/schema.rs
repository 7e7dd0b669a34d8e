//! Table and index definitions, versioned through `PRAGMA user_version`.

use rusqlite::Connection;

use crate::core::errors::{AuditLogError, Result};

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

const V1: &str = "
    CREATE TABLE IF NOT EXISTS operation_log (
        id              TEXT PRIMARY KEY NOT NULL,
        user_id         TEXT,
        user_name       TEXT,
        user_email      TEXT,
        user_role       TEXT,
        action          TEXT NOT NULL,
        resource_type   TEXT NOT NULL,
        resource_id     TEXT,
        method          TEXT NOT NULL,
        endpoint        TEXT NOT NULL,
        request_body    TEXT,
        response_status INTEGER NOT NULL,
        response_body   TEXT,
        ip_address      TEXT NOT NULL,
        user_agent      TEXT,
        timestamp       INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_operation_user_id ON operation_log(user_id);
    CREATE INDEX IF NOT EXISTS idx_operation_timestamp ON operation_log(timestamp);
    CREATE INDEX IF NOT EXISTS idx_operation_action ON operation_log(action);
    CREATE INDEX IF NOT EXISTS idx_operation_resource_type ON operation_log(resource_type);
    CREATE INDEX IF NOT EXISTS idx_operation_user_role ON operation_log(user_role);

    CREATE TABLE IF NOT EXISTS login_log (
        id              TEXT PRIMARY KEY NOT NULL,
        user_id         TEXT,
        user_email      TEXT NOT NULL,
        login_type      TEXT NOT NULL,
        status          TEXT NOT NULL,
        failure_reason  TEXT,
        ip_address      TEXT NOT NULL,
        user_agent      TEXT,
        timestamp       INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_login_user_id ON login_log(user_id);
    CREATE INDEX IF NOT EXISTS idx_login_timestamp ON login_log(timestamp);
    CREATE INDEX IF NOT EXISTS idx_login_type ON login_log(login_type);
    CREATE INDEX IF NOT EXISTS idx_login_user_email ON login_log(user_email);
    CREATE INDEX IF NOT EXISTS idx_login_status ON login_log(status);
";

/// Bring the schema up to `SCHEMA_VERSION`. Safe to run on every open.
pub fn migrate(conn: &Connection) -> Result<()> {
    let current: u32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(AuditLogError::persistence)?;

    if current > SCHEMA_VERSION {
        return Err(AuditLogError::FormatVersionTooNew {
            project_version: current,
            supported_version: SCHEMA_VERSION,
        });
    }
    if current == SCHEMA_VERSION {
        return Ok(());
    }

    tracing::info!(from = current, to = SCHEMA_VERSION, "migrating audit schema");

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| AuditLogError::persistence(format!("migrate begin: {e}")))?;
    tx.execute_batch(V1)
        .map_err(|e| AuditLogError::persistence(format!("migrate v1: {e}")))?;
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)
        .map_err(AuditLogError::persistence)?;
    tx.commit()
        .map_err(|e| AuditLogError::persistence(format!("migrate commit: {e}")))?;

    Ok(())
}
