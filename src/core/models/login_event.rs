use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::{AuditLogError, Result};
use crate::core::models::origin::Origin;
use crate::core::models::vocabulary::LoginType;

/// Outcome of a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginStatus {
    Success,
    Failed,
}

impl LoginStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginStatus::Success => "success",
            LoginStatus::Failed => "failed",
        }
    }
}

impl FromStr for LoginStatus {
    type Err = AuditLogError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "success" => Ok(LoginStatus::Success),
            "failed" => Ok(LoginStatus::Failed),
            other => Err(AuditLogError::InvalidInput {
                field: "status".into(),
                detail: format!("expected 'success' or 'failed', got '{other}'"),
            }),
        }
    }
}

impl fmt::Display for LoginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable authentication attempt record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginEvent {
    pub id: String,
    /// Absent when the attempt failed before the identity was resolved.
    pub user_id: Option<String>,
    /// The identity that was attempted, even on failure.
    pub user_email: String,
    pub login_type: LoginType,
    pub status: LoginStatus,
    /// Usually only present on failure. Not enforced.
    pub failure_reason: Option<String>,
    pub origin: Origin,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
}

impl LoginEvent {
    pub fn is_failed(&self) -> bool {
        self.status == LoginStatus::Failed
    }
}

/// A login event as handed to the writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLoginEvent {
    pub id: String,
    pub user_id: Option<String>,
    pub user_email: String,
    pub login_type: LoginType,
    pub status: LoginStatus,
    pub failure_reason: Option<String>,
    pub origin: Origin,
    pub timestamp: Option<i64>,
}

impl NewLoginEvent {
    pub fn into_event(self, now: i64) -> LoginEvent {
        LoginEvent {
            id: self.id,
            user_id: self.user_id,
            user_email: self.user_email,
            login_type: self.login_type,
            status: self.status,
            failure_reason: self.failure_reason,
            origin: self.origin,
            timestamp: self.timestamp.unwrap_or(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_exact_values_only() {
        assert_eq!("success".parse::<LoginStatus>().unwrap(), LoginStatus::Success);
        assert_eq!("failed".parse::<LoginStatus>().unwrap(), LoginStatus::Failed);
        assert!("FAILED".parse::<LoginStatus>().is_err());
        assert!("error".parse::<LoginStatus>().is_err());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&LoginStatus::Failed).unwrap(),
            "\"failed\""
        );
    }

    #[test]
    fn supplied_timestamp_wins_over_now() {
        let draft = NewLoginEvent {
            id: "l1".into(),
            user_id: None,
            user_email: "a@example.com".into(),
            login_type: LoginType::new("password").unwrap(),
            status: LoginStatus::Failed,
            failure_reason: Some("bad password".into()),
            origin: Origin {
                ip_address: "10.0.0.1".into(),
                user_agent: None,
            },
            timestamp: Some(42),
        };

        assert_eq!(draft.clone().into_event(1_000).timestamp, 42);
        assert_eq!(
            NewLoginEvent {
                timestamp: None,
                ..draft
            }
            .into_event(1_000)
            .timestamp,
            1_000
        );
    }
}
