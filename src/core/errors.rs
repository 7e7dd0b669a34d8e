/// All domain errors for auditlog.
///
/// Each variant provides enough context to diagnose the issue
/// without needing a debugger.
#[derive(Debug, thiserror::Error)]
pub enum AuditLogError {
    #[error(
        "Could not persist record: {detail}\n\n  \
         The record was NOT written. Nothing is retried automatically.\n  \
         If the id already exists, record the event again with a new --id."
    )]
    Persistence { detail: String },

    #[error(
        "Could not compute summary: {detail}\n\n  \
         No partial summary was produced. Check that the store is reachable\n  \
         and run the command again."
    )]
    Aggregation { detail: String },

    #[error("Query failed: {detail}")]
    Query { detail: String },

    #[error(
        "Stored record could not be decoded: {detail}\n\n  \
         The store may have been edited by hand or written by a newer version."
    )]
    CorruptRecord { detail: String },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error("Invalid value for {field}: {detail}")]
    InvalidInput { field: String, detail: String },

    #[error(
        "Access denied for role '{role}'\n\n  \
         Audit queries are restricted to audit administrators.\n  \
         Pass an admitted role with --role (see [access].audit_roles in config.toml)."
    )]
    AccessDenied { role: String },

    #[error(
        "This store uses format version {project_version}, but your auditlog \
         only supports up to version {supported_version}.\n\n  \
         Solutions:\n    \
         → Upgrade auditlog to a build that knows this format"
    )]
    FormatVersionTooNew {
        project_version: u32,
        supported_version: u32,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AuditLogError {
    pub fn persistence(detail: impl std::fmt::Display) -> Self {
        Self::Persistence {
            detail: detail.to_string(),
        }
    }

    pub fn aggregation(detail: impl std::fmt::Display) -> Self {
        Self::Aggregation {
            detail: detail.to_string(),
        }
    }

    pub fn query(detail: impl std::fmt::Display) -> Self {
        Self::Query {
            detail: detail.to_string(),
        }
    }

    pub fn corrupt(detail: impl std::fmt::Display) -> Self {
        Self::CorruptRecord {
            detail: detail.to_string(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AuditLogError>;
