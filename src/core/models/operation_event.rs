use serde::{Deserialize, Serialize};

use crate::core::models::origin::Origin;
use crate::core::models::vocabulary::Action;

/// Responses with a status at or above this value count as failed.
pub const FAILED_STATUS_THRESHOLD: i64 = 400;

/// Who performed an operation. Every field is optional: unauthenticated
/// actions carry no identity at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub user_role: Option<String>,
}

/// The object an operation acted upon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub resource_type: String,
    pub resource_id: Option<String>,
}

/// HTTP-shaped request details. The body is stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestInfo {
    pub method: String,
    pub endpoint: String,
    pub body: Option<String>,
}

/// Outcome of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseInfo {
    pub status: i64,
    pub body: Option<String>,
}

/// One immutable operation audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationEvent {
    pub id: String,
    pub actor: Actor,
    pub action: Action,
    pub resource: Resource,
    pub request: RequestInfo,
    pub response: ResponseInfo,
    pub origin: Origin,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
}

impl OperationEvent {
    pub fn is_failed(&self) -> bool {
        self.response.status >= FAILED_STATUS_THRESHOLD
    }
}

/// An operation event as handed to the writer. `timestamp` is filled in
/// with the write time when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOperationEvent {
    pub id: String,
    pub actor: Actor,
    pub action: Action,
    pub resource: Resource,
    pub request: RequestInfo,
    pub response: ResponseInfo,
    pub origin: Origin,
    pub timestamp: Option<i64>,
}

impl NewOperationEvent {
    /// Produce the record that will be stored, using `now` when the
    /// caller supplied no timestamp.
    pub fn into_event(self, now: i64) -> OperationEvent {
        OperationEvent {
            id: self.id,
            actor: self.actor,
            action: self.action,
            resource: self.resource,
            request: self.request,
            response: self.response,
            origin: self.origin,
            timestamp: self.timestamp.unwrap_or(now),
        }
    }
}
