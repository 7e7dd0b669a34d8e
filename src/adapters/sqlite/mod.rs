pub mod login_queries;
pub mod operation_queries;
pub mod pool;
pub mod predicate;
pub mod schema;
pub mod sqlite_store;

use std::collections::BTreeMap;

use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};

use crate::core::errors::{AuditLogError, Result};
use crate::core::models::filter::Page;

/// Map a read-path error, separating undecodable rows from storage failures.
pub(crate) fn read_err(e: rusqlite::Error) -> AuditLogError {
    match e {
        rusqlite::Error::FromSqlConversionFailure(col, _, inner) => {
            AuditLogError::corrupt(format!("column {col}: {inner}"))
        }
        other => AuditLogError::query(other),
    }
}

/// LIMIT and OFFSET values. SQLite takes signed 64-bit integers.
pub(crate) fn page_values(page: Page) -> [Value; 2] {
    [
        Value::Integer(i64::try_from(page.limit).unwrap_or(i64::MAX)),
        Value::Integer(i64::try_from(page.skip).unwrap_or(i64::MAX)),
    ]
}

/// Run a `SELECT key, COUNT(*) ... GROUP BY` and collect it.
pub(crate) fn grouped(
    conn: &Connection,
    sql: &str,
    params: &[Value],
) -> Result<BTreeMap<String, u64>> {
    let mut stmt = conn.prepare(sql).map_err(AuditLogError::aggregation)?;
    let rows = stmt
        .query_map(params_from_iter(params), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })
        .map_err(AuditLogError::aggregation)?;

    let mut groups = BTreeMap::new();
    for row in rows {
        let (key, n) = row.map_err(AuditLogError::aggregation)?;
        groups.insert(key, n as u64);
    }
    Ok(groups)
}
