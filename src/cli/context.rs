use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::adapters::jsonl::jsonl_store::JsonLinesStore;
use crate::adapters::sqlite::sqlite_store::SqliteStore;
use crate::config::app_config::{AppConfig, StoreBackend};
use crate::core::errors::{AuditLogError, Result};
use crate::core::models::filter::Page;
use crate::core::services::access_guard::AccessGuard;
use crate::core::services::login_log_service::LoginLogService;
use crate::core::services::operation_log_service::OperationLogService;
use crate::core::traits::AuditStore;

const DEFAULT_DIR: &str = ".auditlog";

static AUDITLOG_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Initialize the global auditlog directory path.
/// If `custom` is provided, uses that path; otherwise defaults to `.auditlog`.
pub fn init(custom: Option<&Path>) {
    let dir = custom
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DIR));
    let _ = AUDITLOG_DIR.set(dir);
}

/// Get the current auditlog directory path.
pub fn auditlog_dir() -> &'static Path {
    AUDITLOG_DIR
        .get()
        .map(|p| p.as_path())
        .unwrap_or(Path::new(DEFAULT_DIR))
}

/// Open the store the config points at.
pub fn open_store(config: &AppConfig, dir: &Path) -> Result<Box<dyn AuditStore>> {
    let location = config.store_path(dir);
    let store: Box<dyn AuditStore> = match config.store.backend {
        StoreBackend::Sqlite => Box::new(SqliteStore::open(
            &location,
            config.store.read_connections,
        )?),
        StoreBackend::Jsonl => Box::new(JsonLinesStore::new(&location)),
    };
    tracing::debug!(backend = store.backend_name(), location = %location.display(), "store ready");
    Ok(store)
}

/// Everything a command needs once the auditlog directory is known to
/// exist: validated config, the opened store and the access guard.
pub struct Workspace {
    pub config: AppConfig,
    pub store: Box<dyn AuditStore>,
    guard: AccessGuard,
}

impl Workspace {
    pub fn open() -> Result<Self> {
        let dir = auditlog_dir();
        if !dir.exists() {
            return Err(AuditLogError::InvalidConfig {
                detail: format!(
                    "auditlog not initialized ({} missing). Run 'auditlog init' first.",
                    dir.display()
                ),
            });
        }

        let config = AppConfig::load(dir)?;
        let store = open_store(&config, dir)?;
        let guard = AccessGuard::new(config.access.audit_roles.clone());
        Ok(Self {
            config,
            store,
            guard,
        })
    }

    /// Reject the caller unless `role` may read the audit trail.
    pub fn authorize(&self, role: Option<&str>) -> Result<()> {
        self.guard.authorize(role)
    }

    pub fn operations(&self) -> OperationLogService<&dyn AuditStore> {
        OperationLogService {
            store: self.store.as_ref(),
        }
    }

    pub fn logins(&self) -> LoginLogService<&dyn AuditStore> {
        LoginLogService {
            store: self.store.as_ref(),
        }
    }

    /// Build a page from CLI values, applying `[query]` limits.
    pub fn page(&self, skip: u64, limit: Option<u64>) -> Page {
        Page::new(skip, self.config.query.effective_limit(limit))
    }
}
