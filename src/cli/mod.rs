pub mod commands;
pub mod context;
pub mod output;

use std::path::PathBuf;

use chrono::DateTime;
use clap::{Args, Parser, Subcommand};

use crate::config::app_config::StoreBackend;
use crate::core::errors::{AuditLogError, Result};
use crate::core::models::filter::{LoginFilter, OperationFilter, TimeWindow};
use crate::core::models::login_event::LoginStatus;
use crate::core::models::vocabulary::{Action, LoginType};

/// Append-only audit trail for operations and logins.
#[derive(Parser, Debug)]
#[command(name = "auditlog", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding config.toml and the store (default: .auditlog)
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Role of the caller, checked against [access].audit_roles for queries
    #[arg(long, global = true, env = "AUDITLOG_ROLE")]
    pub role: Option<String>,

    /// Print records, counts and summaries as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode: only show errors and requested data
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize an audit store in the current directory
    Init {
        /// Storage backend: sqlite or jsonl
        #[arg(long, default_value = "sqlite")]
        backend: StoreBackend,
    },

    /// Append one event to the audit trail
    Record {
        #[command(subcommand)]
        event: RecordEvent,
    },

    /// Query operation events
    Ops {
        #[command(subcommand)]
        query: OpsQuery,
    },

    /// Query login events
    Logins {
        #[command(subcommand)]
        query: LoginsQuery,
    },
}

#[derive(Subcommand, Debug)]
pub enum RecordEvent {
    /// Record an operation performed against a resource
    Operation(RecordOperationArgs),
    /// Record an authentication attempt
    Login(RecordLoginArgs),
}

#[derive(Args, Debug)]
pub struct RecordOperationArgs {
    /// Operation kind, e.g. CREATE, UPDATE, DELETE, READ
    #[arg(long)]
    pub action: Action,
    #[arg(long)]
    pub resource_type: String,
    #[arg(long)]
    pub resource_id: Option<String>,
    /// HTTP method of the request
    #[arg(long)]
    pub method: String,
    #[arg(long)]
    pub endpoint: String,
    /// Response status code; 400 and above counts as failed
    #[arg(long)]
    pub status: i64,
    #[arg(long)]
    pub ip: String,
    #[arg(long)]
    pub user_id: Option<String>,
    #[arg(long)]
    pub user_name: Option<String>,
    #[arg(long)]
    pub user_email: Option<String>,
    #[arg(long)]
    pub user_role: Option<String>,
    #[arg(long)]
    pub request_body: Option<String>,
    #[arg(long)]
    pub response_body: Option<String>,
    #[arg(long)]
    pub user_agent: Option<String>,
    #[command(flatten)]
    pub stamp: StampArgs,
}

#[derive(Args, Debug)]
pub struct RecordLoginArgs {
    /// Identity that was attempted
    #[arg(long)]
    pub email: String,
    /// Mechanism, e.g. password, oauth, ldap, api_key
    #[arg(long)]
    pub login_type: LoginType,
    /// success or failed
    #[arg(long)]
    pub status: LoginStatus,
    #[arg(long)]
    pub ip: String,
    #[arg(long)]
    pub user_id: Option<String>,
    /// Failure reason, usually given with --status failed
    #[arg(long)]
    pub reason: Option<String>,
    #[arg(long)]
    pub user_agent: Option<String>,
    #[command(flatten)]
    pub stamp: StampArgs,
}

/// Identity and time of a new record; both default when omitted.
#[derive(Args, Debug)]
pub struct StampArgs {
    /// Record id (default: a fresh UUID)
    #[arg(long)]
    pub id: Option<String>,
    /// Event time as epoch seconds or RFC 3339 (default: now)
    #[arg(long, value_parser = parse_timestamp)]
    pub timestamp: Option<i64>,
}

#[derive(Subcommand, Debug)]
pub enum OpsQuery {
    /// List matching operations, newest first
    List {
        #[command(flatten)]
        filter: OperationFilterArgs,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Count matching operations
    Count {
        #[command(flatten)]
        filter: OperationFilterArgs,
    },
    /// Operations performed by one user
    User {
        user_id: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Operations performed by administrative roles
    Admins {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Statistics over a time window
    Summary {
        #[command(flatten)]
        window: WindowArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum LoginsQuery {
    /// List matching logins, newest first
    List {
        #[command(flatten)]
        filter: LoginFilterArgs,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Count matching logins
    Count {
        #[command(flatten)]
        filter: LoginFilterArgs,
    },
    /// Login attempts of one user
    User {
        user_id: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Failed login attempts
    Failed {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Statistics over a time window
    Summary {
        #[command(flatten)]
        window: WindowArgs,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct OperationFilterArgs {
    #[arg(long)]
    pub user_id: Option<String>,
    #[arg(long)]
    pub user_role: Option<String>,
    #[arg(long)]
    pub action: Option<String>,
    #[arg(long)]
    pub resource_type: Option<String>,
    #[arg(long)]
    pub ip: Option<String>,
    /// Earliest timestamp, inclusive
    #[arg(long, value_parser = parse_timestamp)]
    pub start: Option<i64>,
    /// Latest timestamp, inclusive
    #[arg(long, value_parser = parse_timestamp)]
    pub end: Option<i64>,
}

impl OperationFilterArgs {
    pub fn to_filter(&self) -> OperationFilter {
        OperationFilter {
            user_id: self.user_id.clone(),
            user_role: self.user_role.clone(),
            action: self.action.clone(),
            resource_type: self.resource_type.clone(),
            ip_address: self.ip.clone(),
            start_time: self.start,
            end_time: self.end,
            user_role_in: None,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct LoginFilterArgs {
    #[arg(long)]
    pub user_id: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub login_type: Option<String>,
    #[arg(long)]
    pub status: Option<LoginStatus>,
    #[arg(long)]
    pub ip: Option<String>,
    /// Earliest timestamp, inclusive
    #[arg(long, value_parser = parse_timestamp)]
    pub start: Option<i64>,
    /// Latest timestamp, inclusive
    #[arg(long, value_parser = parse_timestamp)]
    pub end: Option<i64>,
}

impl LoginFilterArgs {
    pub fn to_filter(&self) -> LoginFilter {
        LoginFilter {
            user_id: self.user_id.clone(),
            user_email: self.email.clone(),
            login_type: self.login_type.clone(),
            status: self.status,
            ip_address: self.ip.clone(),
            start_time: self.start,
            end_time: self.end,
        }
    }
}

#[derive(Args, Debug, Clone, Copy)]
pub struct PageArgs {
    /// Number of matching records to skip
    #[arg(long, default_value_t = 0)]
    pub skip: u64,
    /// Maximum records to return (default and cap come from [query])
    #[arg(long)]
    pub limit: Option<u64>,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct WindowArgs {
    /// Window start, inclusive
    #[arg(long, value_parser = parse_timestamp)]
    pub start: i64,
    /// Window end, inclusive
    #[arg(long, value_parser = parse_timestamp)]
    pub end: i64,
}

impl WindowArgs {
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end)
    }
}

/// Parse a timestamp given as epoch seconds or RFC 3339.
pub fn parse_timestamp(s: &str) -> Result<i64> {
    if let Ok(secs) = s.parse::<i64>() {
        return Ok(secs);
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.timestamp())
        .map_err(|_| AuditLogError::InvalidInput {
            field: "timestamp".into(),
            detail: format!(
                "'{s}' is neither epoch seconds nor RFC 3339 \
                 (e.g. 1700000000 or 2026-01-15T09:30:00Z)"
            ),
        })
}
