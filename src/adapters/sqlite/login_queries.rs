//! Insert, list, count and summarize against `login_log`.

use rusqlite::types::Type;
use rusqlite::{Connection, Row, params, params_from_iter};

use super::predicate::{SqlPredicate, login_predicate};
use super::{grouped, page_values, read_err};
use crate::core::errors::{AuditLogError, Result};
use crate::core::models::filter::{LoginFilter, Page, TimeWindow};
use crate::core::models::login_event::{LoginEvent, LoginStatus};
use crate::core::models::origin::Origin;
use crate::core::models::summary::LoginSummary;
use crate::core::models::vocabulary::LoginType;

const LOGIN_COLUMNS: &str = "id, user_id, user_email, login_type, status, failure_reason,
     ip_address, user_agent, timestamp";

pub fn insert(conn: &Connection, event: &LoginEvent) -> Result<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| AuditLogError::persistence(format!("insert begin: {e}")))?;

    tx.execute(
        &format!(
            "INSERT INTO login_log ({LOGIN_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
        ),
        params![
            event.id,
            event.user_id,
            event.user_email,
            event.login_type.as_str(),
            event.status.as_str(),
            event.failure_reason,
            event.origin.ip_address,
            event.origin.user_agent,
            event.timestamp,
        ],
    )
    .map_err(|e| AuditLogError::persistence(format!("login {}: {e}", event.id)))?;

    tx.commit()
        .map_err(|e| AuditLogError::persistence(format!("insert commit: {e}")))
}

pub fn list(conn: &Connection, filter: &LoginFilter, page: Page) -> Result<Vec<LoginEvent>> {
    let predicate = login_predicate(filter);
    let sql = format!(
        "SELECT {LOGIN_COLUMNS} FROM login_log{}
         ORDER BY timestamp DESC, rowid DESC
         LIMIT {} OFFSET {}",
        predicate.where_sql(),
        predicate.next_slot(1),
        predicate.next_slot(2),
    );

    let mut stmt = conn.prepare(&sql).map_err(read_err)?;
    let rows = stmt
        .query_map(
            params_from_iter(predicate.params_with(&page_values(page))),
            parse_login_row,
        )
        .map_err(read_err)?;

    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(read_err)
}

pub fn count(conn: &Connection, filter: &LoginFilter) -> Result<u64> {
    let predicate = login_predicate(filter);
    let sql = format!("SELECT COUNT(*) FROM login_log{}", predicate.where_sql());
    let n: i64 = conn
        .query_row(&sql, params_from_iter(predicate.params()), |row| row.get(0))
        .map_err(read_err)?;
    Ok(n as u64)
}

pub fn summarize(conn: &Connection, window: TimeWindow) -> Result<LoginSummary> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| AuditLogError::aggregation(format!("summary begin: {e}")))?;

    let predicate =
        SqlPredicate::new().within("timestamp", Some(window.start), Some(window.end));
    let scope = predicate.where_sql();

    let (total, succeeded, failed, users): (i64, i64, i64, i64) = tx
        .query_row(
            &format!(
                "SELECT COUNT(*),
                        COALESCE(SUM(CASE WHEN status = 'success' THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END), 0),
                        COUNT(DISTINCT user_id)
                 FROM login_log{scope}"
            ),
            params_from_iter(predicate.params()),
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .map_err(AuditLogError::aggregation)?;

    let by_type = grouped(
        &tx,
        &format!("SELECT login_type, COUNT(*) FROM login_log{scope} GROUP BY login_type"),
        predicate.params(),
    )?;

    tx.commit()
        .map_err(|e| AuditLogError::aggregation(format!("summary end: {e}")))?;

    Ok(LoginSummary {
        total_logins: total as u64,
        successful_logins: succeeded as u64,
        failed_logins: failed as u64,
        logins_by_type: by_type,
        unique_users: users as u64,
    })
}

fn parse_login_row(row: &Row<'_>) -> rusqlite::Result<LoginEvent> {
    let login_type: String = row.get(3)?;
    let login_type = LoginType::new(login_type)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;
    let status: String = row.get(4)?;
    let status = status
        .parse::<LoginStatus>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(LoginEvent {
        id: row.get(0)?,
        user_id: row.get(1)?,
        user_email: row.get(2)?,
        login_type,
        status,
        failure_reason: row.get(5)?,
        origin: Origin {
            ip_address: row.get(6)?,
            user_agent: row.get(7)?,
        },
        timestamp: row.get(8)?,
    })
}
