use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::core::models::login_event::{LoginEvent, LoginStatus};
use crate::core::models::operation_event::OperationEvent;

/// Group key for records whose grouping field is absent.
///
/// A record whose role really is `"unassigned"` lands in the same bucket,
/// so the two cannot be told apart in `operations_by_user_role`.
pub const UNASSIGNED_GROUP: &str = "unassigned";

/// Fixed-shape statistics over the operation events in a time window.
///
/// Groupings only contain categories that occur in the window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSummary {
    pub total_operations: u64,
    pub operations_by_action: BTreeMap<String, u64>,
    pub operations_by_user_role: BTreeMap<String, u64>,
    pub operations_by_resource_type: BTreeMap<String, u64>,
    pub failed_operations: u64,
    pub unique_users: u64,
}

impl OperationSummary {
    /// Aggregate the given events. The caller is responsible for passing
    /// exactly the events of the window.
    pub fn tally<'a>(events: impl IntoIterator<Item = &'a OperationEvent>) -> Self {
        let mut summary = Self::default();
        let mut users = HashSet::new();

        for event in events {
            summary.total_operations += 1;
            bump(&mut summary.operations_by_action, event.action.as_str());
            bump(
                &mut summary.operations_by_user_role,
                event.actor.user_role.as_deref().unwrap_or(UNASSIGNED_GROUP),
            );
            bump(
                &mut summary.operations_by_resource_type,
                &event.resource.resource_type,
            );
            if event.is_failed() {
                summary.failed_operations += 1;
            }
            if let Some(user_id) = &event.actor.user_id {
                users.insert(user_id.as_str());
            }
        }

        summary.unique_users = users.len() as u64;
        summary
    }
}

/// Fixed-shape statistics over the login events in a time window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginSummary {
    pub total_logins: u64,
    pub successful_logins: u64,
    pub failed_logins: u64,
    pub logins_by_type: BTreeMap<String, u64>,
    pub unique_users: u64,
}

impl LoginSummary {
    pub fn tally<'a>(events: impl IntoIterator<Item = &'a LoginEvent>) -> Self {
        let mut summary = Self::default();
        let mut users = HashSet::new();

        for event in events {
            summary.total_logins += 1;
            match event.status {
                LoginStatus::Success => summary.successful_logins += 1,
                LoginStatus::Failed => summary.failed_logins += 1,
            }
            bump(&mut summary.logins_by_type, event.login_type.as_str());
            if let Some(user_id) = &event.user_id {
                users.insert(user_id.as_str());
            }
        }

        summary.unique_users = users.len() as u64;
        summary
    }
}

fn bump(groups: &mut BTreeMap<String, u64>, key: &str) {
    *groups.entry(key.to_string()).or_insert(0) += 1;
}
