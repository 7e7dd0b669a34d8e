use chrono::Utc;

use crate::core::errors::Result;
use crate::core::models::filter::{OperationFilter, Page, TimeWindow};
use crate::core::models::operation_event::{NewOperationEvent, OperationEvent};
use crate::core::models::summary::OperationSummary;
use crate::core::traits::operation_log::OperationLogStore;

/// Write, read and summarize operation events through an
/// `OperationLogStore` backend.
pub struct OperationLogService<S: OperationLogStore> {
    pub store: S,
}

impl<S: OperationLogStore> OperationLogService<S> {
    /// Persist one event, stamping it with the current time if the caller
    /// supplied none. Returns the record exactly as stored.
    pub fn record(&self, event: NewOperationEvent) -> Result<OperationEvent> {
        let event = event.into_event(Utc::now().timestamp());
        self.store.insert_operation(&event)?;
        tracing::debug!(
            id = %event.id,
            action = %event.action,
            timestamp = event.timestamp,
            "operation event recorded"
        );
        Ok(event)
    }

    pub fn list(&self, filter: &OperationFilter, page: Page) -> Result<Vec<OperationEvent>> {
        self.store.list_operations(filter, page)
    }

    pub fn count(&self, filter: &OperationFilter) -> Result<u64> {
        self.store.count_operations(filter)
    }

    /// Everything one actor did, newest first.
    pub fn list_for_user(&self, user_id: &str, page: Page) -> Result<Vec<OperationEvent>> {
        self.store
            .list_operations(&OperationFilter::for_user(user_id), page)
    }

    /// Activity of actors whose role is in the administrative set.
    pub fn list_admin_activity(
        &self,
        admin_roles: &[String],
        page: Page,
    ) -> Result<Vec<OperationEvent>> {
        self.store
            .list_operations(&OperationFilter::for_roles(admin_roles), page)
    }

    pub fn summarize(&self, window: TimeWindow) -> Result<OperationSummary> {
        self.store.summarize_operations(window)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::adapters::sqlite::sqlite_store::SqliteStore;
    use crate::core::errors::AuditLogError;
    use crate::core::models::operation_event::{Actor, RequestInfo, Resource, ResponseInfo};
    use crate::core::models::origin::Origin;
    use crate::core::models::vocabulary::Action;

    fn draft(
        id: &str,
        role: &str,
        action: &str,
        status: i64,
        timestamp: Option<i64>,
    ) -> NewOperationEvent {
        NewOperationEvent {
            id: id.to_string(),
            actor: Actor {
                user_id: Some(format!("user-{role}")),
                user_name: Some(role.to_string()),
                user_email: Some(format!("{role}@example.com")),
                user_role: Some(role.to_string()),
            },
            action: Action::new(action).unwrap(),
            resource: Resource {
                resource_type: "model".into(),
                resource_id: Some("m-1".into()),
            },
            request: RequestInfo {
                method: "POST".into(),
                endpoint: "/api/models".into(),
                body: Some("{\"name\":\"m\"}".into()),
            },
            response: ResponseInfo {
                status,
                body: None,
            },
            origin: Origin {
                ip_address: "192.168.1.20".into(),
                user_agent: Some("curl/8.0".into()),
            },
            timestamp,
        }
    }

    fn service(store: &SqliteStore) -> OperationLogService<&SqliteStore> {
        OperationLogService { store }
    }

    #[test]
    fn record_then_read_back_identical() {
        let store = SqliteStore::open_in_memory().unwrap();
        let svc = service(&store);

        let stored = svc
            .record(draft("op-1", "admin", "CREATE", 201, Some(1_700_000_000)))
            .unwrap();
        let found = svc.list_for_user("user-admin", Page::default()).unwrap();

        assert_eq!(found, vec![stored]);
    }

    #[test]
    fn record_defaults_timestamp_to_now() {
        let store = SqliteStore::open_in_memory().unwrap();
        let svc = service(&store);

        let before = Utc::now().timestamp();
        let stored = svc.record(draft("op-1", "user", "READ", 200, None)).unwrap();
        let after = Utc::now().timestamp();

        assert!(stored.timestamp >= before && stored.timestamp <= after);
        let found = svc.list(&OperationFilter::default(), Page::default()).unwrap();
        assert_eq!(found[0].timestamp, stored.timestamp);
    }

    #[test]
    fn duplicate_id_is_a_persistence_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        let svc = service(&store);

        svc.record(draft("op-1", "user", "READ", 200, Some(1))).unwrap();
        let err = svc
            .record(draft("op-1", "user", "UPDATE", 200, Some(2)))
            .unwrap_err();

        assert!(matches!(err, AuditLogError::Persistence { .. }));
        assert_eq!(svc.count(&OperationFilter::default()).unwrap(), 1);
    }

    #[test]
    fn paging_exhausts_exactly_count_rows() {
        let store = SqliteStore::open_in_memory().unwrap();
        let svc = service(&store);

        // Repeated timestamps exercise the tie order.
        for i in 0..23 {
            let role = if i % 3 == 0 { "admin" } else { "user" };
            svc.record(draft(&format!("op-{i}"), role, "READ", 200, Some(100 + i / 4)))
                .unwrap();
        }

        let filter = OperationFilter {
            user_role: Some("user".into()),
            ..Default::default()
        };
        let total = svc.count(&filter).unwrap();

        let mut seen = Vec::new();
        let mut skip = 0;
        loop {
            let page = svc.list(&filter, Page::new(skip, 4)).unwrap();
            if page.is_empty() {
                break;
            }
            assert!(page.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
            seen.extend(page.into_iter().map(|e| e.id));
            skip += 4;
        }

        let unique: HashSet<_> = seen.iter().collect();
        assert_eq!(seen.len() as u64, total);
        assert_eq!(unique.len(), seen.len());
    }

    #[test]
    fn admin_activity_uses_role_set() {
        let store = SqliteStore::open_in_memory().unwrap();
        let svc = service(&store);

        svc.record(draft("op-1", "audit_admin", "READ", 200, Some(1))).unwrap();
        svc.record(draft("op-2", "user", "READ", 200, Some(2))).unwrap();
        svc.record(draft("op-3", "system_admin", "DELETE", 200, Some(3))).unwrap();

        let roles = vec!["system_admin".to_string(), "audit_admin".to_string()];
        let found = svc.list_admin_activity(&roles, Page::default()).unwrap();
        let ids: Vec<_> = found.iter().map(|e| e.id.as_str()).collect();

        assert_eq!(ids, vec!["op-3", "op-1"]);
    }

    #[test]
    fn summary_partitions_window() {
        let store = SqliteStore::open_in_memory().unwrap();
        let svc = service(&store);

        svc.record(draft("op-1", "admin", "CREATE", 201, Some(100))).unwrap();
        svc.record(draft("op-2", "user", "READ", 404, Some(150))).unwrap();
        svc.record(draft("op-3", "user", "READ", 500, Some(200))).unwrap();
        svc.record(draft("op-4", "user", "DELETE", 200, Some(201))).unwrap();

        let summary = svc.summarize(TimeWindow::new(100, 200)).unwrap();

        assert_eq!(summary.total_operations, 3);
        assert_eq!(summary.failed_operations, 2);
        assert_eq!(summary.unique_users, 2);
        assert_eq!(summary.operations_by_action.get("DELETE"), None);
        assert_eq!(
            summary.operations_by_action.values().sum::<u64>(),
            summary.total_operations
        );
        assert_eq!(
            summary.operations_by_user_role.values().sum::<u64>(),
            summary.total_operations
        );
        assert_eq!(summary.operations_by_resource_type["model"], 3);
    }
}
