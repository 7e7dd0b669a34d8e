mod adapters;
mod cli;
mod config;
mod core;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use cli::{Cli, Commands};
use config::app_config::AppConfig;

fn main() {
    let args = Cli::parse();

    cli::context::init(args.dir.as_deref());
    init_tracing(args.verbose);

    let role = args.role.as_deref();

    let result = match &args.command {
        Commands::Init { backend } => {
            cli::commands::init::execute(*backend, args.verbose, args.quiet)
        }
        Commands::Record { event } => cli::commands::record::execute(event, args.json, args.quiet),
        Commands::Ops { query } => cli::commands::ops::execute(query, role, args.json),
        Commands::Logins { query } => cli::commands::logins::execute(query, role, args.json),
    };

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins, then `--verbose`,
/// then `[logging] level` from config.toml when it can be read.
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose {
            "auditlog=debug".to_string()
        } else {
            AppConfig::load(cli::context::auditlog_dir())
                .map(|c| c.logging.level)
                .unwrap_or_else(|_| "warn".to_string())
        };
        EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("warn"))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
