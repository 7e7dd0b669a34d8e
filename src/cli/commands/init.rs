use crate::cli::context;
use crate::cli::output;
use crate::config::app_config::{self, AppConfig, StoreBackend};
use crate::core::errors::{AuditLogError, Result};

/// Execute the `auditlog init` command.
///
/// Creates the auditlog directory, writes a default config.toml for the
/// chosen backend and creates an empty store.
pub fn execute(backend: StoreBackend, verbose: bool, quiet: bool) -> Result<()> {
    let dir = context::auditlog_dir();

    if dir.exists() {
        return Err(AuditLogError::InvalidConfig {
            detail: format!(
                "auditlog is already initialized here ({} exists)",
                dir.display()
            ),
        });
    }

    if !quiet {
        output::header("auditlog: initializing store");
    }

    std::fs::create_dir_all(dir)?;
    std::fs::write(
        dir.join(app_config::CONFIG_FILE),
        app_config::default_config_toml(backend),
    )?;

    let config = AppConfig::load(dir)?;
    if backend == StoreBackend::Jsonl {
        std::fs::create_dir_all(config.store_path(dir))?;
    }
    let store = context::open_store(&config, dir)?;
    tracing::info!(backend = store.backend_name(), dir = %dir.display(), "audit store initialized");

    if !quiet {
        output::success(&format!("Created {}", dir.display()));
        output::success(&format!(
            "Created {} store at {}",
            store.backend_name(),
            config.store_path(dir).display()
        ));
        print_next_steps(verbose);
    }

    Ok(())
}

fn print_next_steps(verbose: bool) {
    println!();
    println!("  Next steps:");
    println!("     1. Record events with 'auditlog record operation' or 'auditlog record login'");
    println!("     2. Query them with --role audit_admin, e.g. 'auditlog ops list'");

    if verbose {
        println!();
        println!("  Files created:");
        println!("     config.toml   store, query limits and access roles");
    }
}
