//! Insert, list, count and summarize against `operation_log`.

use rusqlite::types::Value;
use rusqlite::{Connection, Row, params, params_from_iter};

use super::predicate::{SqlPredicate, operation_predicate};
use super::{grouped, page_values, read_err};
use crate::core::errors::{AuditLogError, Result};
use crate::core::models::filter::{OperationFilter, Page, TimeWindow};
use crate::core::models::operation_event::{
    Actor, FAILED_STATUS_THRESHOLD, OperationEvent, RequestInfo, Resource, ResponseInfo,
};
use crate::core::models::origin::Origin;
use crate::core::models::summary::{OperationSummary, UNASSIGNED_GROUP};
use crate::core::models::vocabulary::Action;

/// Column order understood by `parse_operation_row`.
const OPERATION_COLUMNS: &str = "id, user_id, user_name, user_email, user_role, action,
     resource_type, resource_id, method, endpoint, request_body,
     response_status, response_body, ip_address, user_agent, timestamp";

pub fn insert(conn: &Connection, event: &OperationEvent) -> Result<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| AuditLogError::persistence(format!("insert begin: {e}")))?;

    tx.execute(
        &format!(
            "INSERT INTO operation_log ({OPERATION_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
        ),
        params![
            event.id,
            event.actor.user_id,
            event.actor.user_name,
            event.actor.user_email,
            event.actor.user_role,
            event.action.as_str(),
            event.resource.resource_type,
            event.resource.resource_id,
            event.request.method,
            event.request.endpoint,
            event.request.body,
            event.response.status,
            event.response.body,
            event.origin.ip_address,
            event.origin.user_agent,
            event.timestamp,
        ],
    )
    .map_err(|e| AuditLogError::persistence(format!("operation {}: {e}", event.id)))?;

    tx.commit()
        .map_err(|e| AuditLogError::persistence(format!("insert commit: {e}")))
}

pub fn list(
    conn: &Connection,
    filter: &OperationFilter,
    page: Page,
) -> Result<Vec<OperationEvent>> {
    let predicate = operation_predicate(filter);
    let sql = format!(
        "SELECT {OPERATION_COLUMNS} FROM operation_log{}
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
            parse_operation_row,
        )
        .map_err(read_err)?;

    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(read_err)
}

pub fn count(conn: &Connection, filter: &OperationFilter) -> Result<u64> {
    let predicate = operation_predicate(filter);
    let sql = format!("SELECT COUNT(*) FROM operation_log{}", predicate.where_sql());
    let n: i64 = conn
        .query_row(&sql, params_from_iter(predicate.params()), |row| row.get(0))
        .map_err(read_err)?;
    Ok(n as u64)
}

/// Aggregate the window inside one read transaction so every figure
/// comes from the same snapshot.
pub fn summarize(conn: &Connection, window: TimeWindow) -> Result<OperationSummary> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| AuditLogError::aggregation(format!("summary begin: {e}")))?;

    let predicate =
        SqlPredicate::new().within("timestamp", Some(window.start), Some(window.end));
    let scope = predicate.where_sql();

    let totals_sql = format!(
        "SELECT COUNT(*),
                COALESCE(SUM(CASE WHEN response_status >= {} THEN 1 ELSE 0 END), 0),
                COUNT(DISTINCT user_id)
         FROM operation_log{scope}",
        predicate.next_slot(1),
    );
    let (total, failed, users): (i64, i64, i64) = tx
        .query_row(
            &totals_sql,
            params_from_iter(predicate.params_with(&[Value::Integer(FAILED_STATUS_THRESHOLD)])),
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .map_err(AuditLogError::aggregation)?;

    let by_action = grouped(
        &tx,
        &format!("SELECT action, COUNT(*) FROM operation_log{scope} GROUP BY action"),
        predicate.params(),
    )?;
    let by_role = grouped(
        &tx,
        &format!(
            "SELECT COALESCE(user_role, '{UNASSIGNED_GROUP}'), COUNT(*)
             FROM operation_log{scope} GROUP BY 1"
        ),
        predicate.params(),
    )?;
    let by_resource = grouped(
        &tx,
        &format!(
            "SELECT resource_type, COUNT(*) FROM operation_log{scope} GROUP BY resource_type"
        ),
        predicate.params(),
    )?;

    tx.commit()
        .map_err(|e| AuditLogError::aggregation(format!("summary end: {e}")))?;

    Ok(OperationSummary {
        total_operations: total as u64,
        operations_by_action: by_action,
        operations_by_user_role: by_role,
        operations_by_resource_type: by_resource,
        failed_operations: failed as u64,
        unique_users: users as u64,
    })
}

fn parse_operation_row(row: &Row<'_>) -> rusqlite::Result<OperationEvent> {
    let action: String = row.get(5)?;
    let action = Action::new(action).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(OperationEvent {
        id: row.get(0)?,
        actor: Actor {
            user_id: row.get(1)?,
            user_name: row.get(2)?,
            user_email: row.get(3)?,
            user_role: row.get(4)?,
        },
        action,
        resource: Resource {
            resource_type: row.get(6)?,
            resource_id: row.get(7)?,
        },
        request: RequestInfo {
            method: row.get(8)?,
            endpoint: row.get(9)?,
            body: row.get(10)?,
        },
        response: ResponseInfo {
            status: row.get(11)?,
            body: row.get(12)?,
        },
        origin: Origin {
            ip_address: row.get(13)?,
            user_agent: row.get(14)?,
        },
        timestamp: row.get(15)?,
    })
}
