use uuid::Uuid;

use crate::cli::context::Workspace;
use crate::cli::output;
use crate::cli::{RecordEvent, RecordLoginArgs, RecordOperationArgs, StampArgs};
use crate::core::errors::Result;
use crate::core::models::login_event::NewLoginEvent;
use crate::core::models::operation_event::{
    Actor, NewOperationEvent, RequestInfo, Resource, ResponseInfo,
};
use crate::core::models::origin::Origin;

/// Execute `auditlog record operation|login`.
///
/// Recording is the instrumentation path and is not gated by role.
pub fn execute(event: &RecordEvent, json: bool, quiet: bool) -> Result<()> {
    let workspace = Workspace::open()?;

    match event {
        RecordEvent::Operation(args) => {
            if !args.action.is_known() {
                tracing::info!(action = %args.action, "action outside the well-known set");
            }
            let stored = workspace.operations().record(new_operation(args))?;
            if json {
                output::json(&stored)?;
            } else if !quiet {
                output::success(&format!(
                    "Recorded operation {} ({} {}) at {}",
                    stored.id,
                    stored.action,
                    stored.resource.resource_type,
                    output::timestamp(stored.timestamp)
                ));
            }
        }
        RecordEvent::Login(args) => {
            if !args.login_type.is_known() {
                tracing::info!(
                    login_type = %args.login_type,
                    "login type outside the well-known set"
                );
            }
            let stored = workspace.logins().record(new_login(args))?;
            if json {
                output::json(&stored)?;
            } else if !quiet {
                output::success(&format!(
                    "Recorded {} login {} for {} at {}",
                    stored.status,
                    stored.id,
                    stored.user_email,
                    output::timestamp(stored.timestamp)
                ));
            }
        }
    }

    Ok(())
}

fn record_id(stamp: &StampArgs) -> String {
    stamp
        .id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn new_operation(args: &RecordOperationArgs) -> NewOperationEvent {
    NewOperationEvent {
        id: record_id(&args.stamp),
        actor: Actor {
            user_id: args.user_id.clone(),
            user_name: args.user_name.clone(),
            user_email: args.user_email.clone(),
            user_role: args.user_role.clone(),
        },
        action: args.action.clone(),
        resource: Resource {
            resource_type: args.resource_type.clone(),
            resource_id: args.resource_id.clone(),
        },
        request: RequestInfo {
            method: args.method.clone(),
            endpoint: args.endpoint.clone(),
            body: args.request_body.clone(),
        },
        response: ResponseInfo {
            status: args.status,
            body: args.response_body.clone(),
        },
        origin: Origin {
            ip_address: args.ip.clone(),
            user_agent: args.user_agent.clone(),
        },
        timestamp: args.stamp.timestamp,
    }
}

fn new_login(args: &RecordLoginArgs) -> NewLoginEvent {
    NewLoginEvent {
        id: record_id(&args.stamp),
        user_id: args.user_id.clone(),
        user_email: args.email.clone(),
        login_type: args.login_type.clone(),
        status: args.status,
        failure_reason: args.reason.clone(),
        origin: Origin {
            ip_address: args.ip.clone(),
            user_agent: args.user_agent.clone(),
        },
        timestamp: args.stamp.timestamp,
    }
}
