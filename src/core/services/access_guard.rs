use crate::core::errors::{AuditLogError, Result};

/// Role reported when the caller gave none.
const ANONYMOUS: &str = "anonymous";

/// Admits callers whose role is one of the configured audit roles.
///
/// Who the caller is gets decided elsewhere; this only checks the role
/// it was handed.
pub struct AccessGuard {
    audit_roles: Vec<String>,
}

impl AccessGuard {
    pub fn new(audit_roles: Vec<String>) -> Self {
        Self { audit_roles }
    }

    pub fn authorize(&self, role: Option<&str>) -> Result<()> {
        match role {
            Some(r) if self.audit_roles.iter().any(|allowed| allowed == r) => Ok(()),
            other => {
                let role = other.unwrap_or(ANONYMOUS).to_string();
                tracing::warn!(%role, "audit query rejected");
                Err(AuditLogError::AccessDenied { role })
            }
        }
    }
}
