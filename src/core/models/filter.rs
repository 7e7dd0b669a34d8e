use crate::core::models::login_event::{LoginEvent, LoginStatus};
use crate::core::models::operation_event::OperationEvent;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_LIMIT: u64 = 50;

/// Offset/limit window over an ordered result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u64,
    pub limit: u64,
}

impl Page {
    pub fn new(skip: u64, limit: u64) -> Self {
        Self { skip, limit }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

/// Closed interval `[start, end]` in epoch seconds.
///
/// `end < start` is not rejected; such a window simply contains nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}

/// Returns the constraint if it is set and non-empty. Empty strings
/// impose no constraint, same as `None`.
pub fn active(constraint: &Option<String>) -> Option<&str> {
    constraint.as_deref().filter(|c| !c.is_empty())
}

fn eq_matches(constraint: &Option<String>, value: Option<&str>) -> bool {
    match active(constraint) {
        Some(expected) => value == Some(expected),
        None => true,
    }
}

fn time_matches(start: Option<i64>, end: Option<i64>, timestamp: i64) -> bool {
    start.is_none_or(|s| timestamp >= s) && end.is_none_or(|e| timestamp <= e)
}

/// Conjunctive filter over operation events. Unset fields impose no
/// constraint; the time bounds are inclusive and independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationFilter {
    pub user_id: Option<String>,
    pub user_role: Option<String>,
    pub action: Option<String>,
    pub resource_type: Option<String>,
    pub ip_address: Option<String>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    /// Role must be one of these. `Some(vec![])` matches nothing.
    pub user_role_in: Option<Vec<String>>,
}

impl OperationFilter {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    pub fn for_roles(roles: &[String]) -> Self {
        Self {
            user_role_in: Some(roles.to_vec()),
            ..Self::default()
        }
    }

    /// In-memory evaluation of the predicate. Storage backends that
    /// translate the filter to a query language must agree with this.
    pub fn matches(&self, event: &OperationEvent) -> bool {
        let role = event.actor.user_role.as_deref();
        eq_matches(&self.user_id, event.actor.user_id.as_deref())
            && eq_matches(&self.user_role, role)
            && eq_matches(&self.action, Some(event.action.as_str()))
            && eq_matches(&self.resource_type, Some(&event.resource.resource_type))
            && eq_matches(&self.ip_address, Some(&event.origin.ip_address))
            && time_matches(self.start_time, self.end_time, event.timestamp)
            && self
                .user_role_in
                .as_ref()
                .is_none_or(|set| role.is_some_and(|r| set.iter().any(|s| s == r)))
    }
}

/// Conjunctive filter over login events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginFilter {
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub login_type: Option<String>,
    pub status: Option<LoginStatus>,
    pub ip_address: Option<String>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
}

impl LoginFilter {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    pub fn failed() -> Self {
        Self {
            status: Some(LoginStatus::Failed),
            ..Self::default()
        }
    }

    pub fn matches(&self, event: &LoginEvent) -> bool {
        eq_matches(&self.user_id, event.user_id.as_deref())
            && eq_matches(&self.user_email, Some(&event.user_email))
            && eq_matches(&self.login_type, Some(event.login_type.as_str()))
            && self.status.is_none_or(|s| s == event.status)
            && eq_matches(&self.ip_address, Some(&event.origin.ip_address))
            && time_matches(self.start_time, self.end_time, event.timestamp)
    }
}
