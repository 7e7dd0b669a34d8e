use colored::Colorize;
use serde_json::json;

use crate::cli::OpsQuery;
use crate::cli::context::Workspace;
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::models::filter::TimeWindow;
use crate::core::models::operation_event::OperationEvent;
use crate::core::models::summary::OperationSummary;

/// Execute `auditlog ops ...`.
///
/// Every query requires an audit role.
pub fn execute(query: &OpsQuery, role: Option<&str>, json: bool) -> Result<()> {
    let workspace = Workspace::open()?;
    workspace.authorize(role)?;
    let service = workspace.operations();

    match query {
        OpsQuery::List { filter, page } => {
            let events = service.list(&filter.to_filter(), workspace.page(page.skip, page.limit))?;
            print_events("auditlog ops", &events, json)
        }
        OpsQuery::Count { filter } => {
            let n = service.count(&filter.to_filter())?;
            if json {
                output::json(&json!({ "count": n }))
            } else {
                println!("{n}");
                Ok(())
            }
        }
        OpsQuery::User { user_id, page } => {
            let events = service.list_for_user(user_id, workspace.page(page.skip, page.limit))?;
            print_events(&format!("auditlog ops for user {user_id}"), &events, json)
        }
        OpsQuery::Admins { page } => {
            let events = service.list_admin_activity(
                &workspace.config.access.admin_roles,
                workspace.page(page.skip, page.limit),
            )?;
            print_events("auditlog ops by admin roles", &events, json)
        }
        OpsQuery::Summary { window } => {
            let window = window.window();
            let summary = service.summarize(window)?;
            if json {
                output::json(&summary)
            } else {
                print_summary(window, &summary);
                Ok(())
            }
        }
    }
}

fn print_events(title: &str, events: &[OperationEvent], json: bool) -> Result<()> {
    if json {
        return output::json(events);
    }

    output::header(&format!("{title} ({} entries)", events.len()));
    if events.is_empty() {
        output::warning("No operations found");
        return Ok(());
    }

    println!();
    for event in events {
        print_event(event);
    }
    Ok(())
}

/// Print a single operation as a formatted row.
fn print_event(event: &OperationEvent) {
    let status = if event.is_failed() {
        event.response.status.to_string().red()
    } else {
        event.response.status.to_string().green()
    };
    let resource = match &event.resource.resource_id {
        Some(id) => format!("{}/{id}", event.resource.resource_type),
        None => event.resource.resource_type.clone(),
    };

    println!(
        "  {} {} {:<8} {} {} {} {}",
        output::timestamp(event.timestamp).dimmed(),
        "│".dimmed(),
        event.action.as_str().cyan(),
        status,
        resource,
        output::or_dash(event.actor.user_id.as_deref()),
        format!("{} {}", event.request.method, event.request.endpoint).dimmed(),
    );
}

fn print_summary(window: TimeWindow, summary: &OperationSummary) {
    output::header(&format!(
        "Operations {} .. {}",
        output::timestamp(window.start),
        output::timestamp(window.end)
    ));
    output::field("total", summary.total_operations, 8);
    output::field("failed", summary.failed_operations, 8);
    output::field("users", summary.unique_users, 8);
    output::breakdown("By action", &summary.operations_by_action);
    output::breakdown("By role", &summary.operations_by_user_role);
    output::breakdown("By resource type", &summary.operations_by_resource_type);
}
