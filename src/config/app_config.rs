use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::core::errors::{AuditLogError, Result};
use crate::core::models::filter::DEFAULT_PAGE_LIMIT;

/// Name of the config file inside the auditlog directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Current format version supported by this build of auditlog.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// Store file or directory names: no separators, no leading dot.
static SIMPLE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("valid regex"));

/// Role names as they appear in `[access]`.
static ROLE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.:-]+$").expect("valid regex"));

/// Top-level configuration read from `.auditlog/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub auditlog: AuditlogSection,
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub query: QuerySection,
    #[serde(default)]
    pub access: AccessSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl AppConfig {
    /// Load and validate `{dir}/config.toml`.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Err(AuditLogError::InvalidConfig {
                detail: format!(
                    "{} not found. Run 'auditlog init' first.",
                    config_path.display()
                ),
            });
        }
        let content = std::fs::read_to_string(&config_path)?;
        Self::parse(&content)
    }

    /// Parse and validate config text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| AuditLogError::InvalidConfig {
            detail: format!("Failed to parse {CONFIG_FILE}: {e}"),
        })?;

        if config.auditlog.format_version > CURRENT_FORMAT_VERSION {
            return Err(AuditLogError::FormatVersionTooNew {
                project_version: config.auditlog.format_version,
                supported_version: CURRENT_FORMAT_VERSION,
            });
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let store_name = self.store.location();
        if !SIMPLE_NAME.is_match(store_name) || store_name.contains("..") {
            return Err(invalid(format!(
                "[store] path '{store_name}' must be a plain name inside the auditlog directory"
            )));
        }

        if self.query.default_limit == 0 || self.query.max_limit == 0 {
            return Err(invalid("[query] limits must be greater than zero".into()));
        }
        if self.query.default_limit > self.query.max_limit {
            return Err(invalid(format!(
                "[query] default_limit ({}) exceeds max_limit ({})",
                self.query.default_limit, self.query.max_limit
            )));
        }

        for (section, roles) in [
            ("audit_roles", &self.access.audit_roles),
            ("admin_roles", &self.access.admin_roles),
        ] {
            if roles.is_empty() {
                return Err(invalid(format!("[access] {section} must not be empty")));
            }
            if let Some(bad) = roles.iter().find(|r| !ROLE_NAME.is_match(r)) {
                return Err(invalid(format!("[access] {section} has invalid role '{bad}'")));
            }
        }

        Ok(())
    }

    /// Absolute location of the store for an auditlog directory.
    pub fn store_path(&self, dir: &Path) -> PathBuf {
        dir.join(self.store.location())
    }
}

fn invalid(detail: String) -> AuditLogError {
    AuditLogError::InvalidConfig { detail }
}

/// The `[auditlog]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditlogSection {
    pub version: String,
    /// Format version for backward compatibility. Defaults to 1 if missing.
    #[serde(default = "default_format_version")]
    pub format_version: u32,
}

fn default_format_version() -> u32 {
    1
}

/// Which storage adapter backs the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Jsonl,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Sqlite => "sqlite",
            StoreBackend::Jsonl => "jsonl",
        }
    }

    /// Store name used when `[store] path` is not set.
    pub fn default_location(&self) -> &'static str {
        match self {
            StoreBackend::Sqlite => "audit.db",
            StoreBackend::Jsonl => "logs",
        }
    }
}

impl FromStr for StoreBackend {
    type Err = AuditLogError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "jsonl" => Ok(StoreBackend::Jsonl),
            other => Err(AuditLogError::InvalidInput {
                field: "backend".into(),
                detail: format!("expected 'sqlite' or 'jsonl', got '{other}'"),
            }),
        }
    }
}

/// The `[store]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSection {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Database file (sqlite) or log directory (jsonl).
    pub path: Option<String>,
    #[serde(default = "default_read_connections")]
    pub read_connections: usize,
}

impl StoreSection {
    /// The configured path, or the backend's default name.
    pub fn location(&self) -> &str {
        self.path
            .as_deref()
            .unwrap_or_else(|| self.backend.default_location())
    }
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: None,
            read_connections: default_read_connections(),
        }
    }
}

fn default_read_connections() -> usize {
    4
}

/// The `[query]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct QuerySection {
    #[serde(default = "default_limit")]
    pub default_limit: u64,
    #[serde(default = "default_max_limit")]
    pub max_limit: u64,
}

impl QuerySection {
    /// Resolve a requested page size: the default when absent, capped at
    /// `max_limit`. Zero stays zero.
    pub fn effective_limit(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.default_limit)
            .min(self.max_limit)
    }
}

impl Default for QuerySection {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_limit() -> u64 {
    DEFAULT_PAGE_LIMIT
}

fn default_max_limit() -> u64 {
    1000
}

/// The `[access]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessSection {
    /// Roles allowed to run queries and summaries.
    #[serde(default = "default_audit_roles")]
    pub audit_roles: Vec<String>,
    /// Roles whose activity `ops admins` lists.
    #[serde(default = "default_admin_roles")]
    pub admin_roles: Vec<String>,
}

impl Default for AccessSection {
    fn default() -> Self {
        Self {
            audit_roles: default_audit_roles(),
            admin_roles: default_admin_roles(),
        }
    }
}

fn default_audit_roles() -> Vec<String> {
    vec!["audit_admin".to_string()]
}

fn default_admin_roles() -> Vec<String> {
    ["system_admin", "auth_admin", "audit_admin", "admin"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// The `[logging]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "warn".to_string()
}

/// Config written by `auditlog init` for the chosen backend.
pub fn default_config_toml(backend: StoreBackend) -> String {
    format!(
        r#"[auditlog]
version = "{version}"
format_version = {CURRENT_FORMAT_VERSION}

[store]
# "sqlite" or "jsonl"
backend = "{backend}"
path = "{path}"
read_connections = 4

[query]
default_limit = 50
max_limit = 1000

[access]
audit_roles = ["audit_admin"]
admin_roles = ["system_admin", "auth_admin", "audit_admin", "admin"]

[logging]
level = "warn"
"#,
        version = env!("CARGO_PKG_VERSION"),
        backend = backend.as_str(),
        path = backend.default_location(),
    )
}
