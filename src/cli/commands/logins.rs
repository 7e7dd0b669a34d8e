use colored::Colorize;
use serde_json::json;

use crate::cli::LoginsQuery;
use crate::cli::context::Workspace;
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::models::filter::TimeWindow;
use crate::core::models::login_event::LoginEvent;
use crate::core::models::summary::LoginSummary;

/// Execute `auditlog logins ...`.
pub fn execute(query: &LoginsQuery, role: Option<&str>, json: bool) -> Result<()> {
    let workspace = Workspace::open()?;
    workspace.authorize(role)?;
    let service = workspace.logins();

    match query {
        LoginsQuery::List { filter, page } => {
            let events = service.list(&filter.to_filter(), workspace.page(page.skip, page.limit))?;
            print_events("auditlog logins", &events, json)
        }
        LoginsQuery::Count { filter } => {
            let n = service.count(&filter.to_filter())?;
            if json {
                output::json(&json!({ "count": n }))
            } else {
                println!("{n}");
                Ok(())
            }
        }
        LoginsQuery::User { user_id, page } => {
            let events = service.list_for_user(user_id, workspace.page(page.skip, page.limit))?;
            print_events(&format!("auditlog logins for user {user_id}"), &events, json)
        }
        LoginsQuery::Failed { page } => {
            let events = service.list_failed(workspace.page(page.skip, page.limit))?;
            print_events("auditlog failed logins", &events, json)
        }
        LoginsQuery::Summary { window } => {
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

fn print_events(title: &str, events: &[LoginEvent], json: bool) -> Result<()> {
    if json {
        return output::json(events);
    }

    output::header(&format!("{title} ({} entries)", events.len()));
    if events.is_empty() {
        output::warning("No logins found");
        return Ok(());
    }

    println!();
    for event in events {
        print_event(event);
    }
    Ok(())
}

fn print_event(event: &LoginEvent) {
    let status = if event.is_failed() {
        event.status.as_str().red()
    } else {
        event.status.as_str().green()
    };

    println!(
        "  {} {} {:<8} {:<8} {} {} {}",
        output::timestamp(event.timestamp).dimmed(),
        "│".dimmed(),
        status,
        event.login_type.as_str().cyan(),
        event.user_email,
        event.origin.ip_address.dimmed(),
        output::or_dash(event.failure_reason.as_deref()),
    );
}

fn print_summary(window: TimeWindow, summary: &LoginSummary) {
    output::header(&format!(
        "Logins {} .. {}",
        output::timestamp(window.start),
        output::timestamp(window.end)
    ));
    output::field("total", summary.total_logins, 10);
    output::field("successful", summary.successful_logins, 10);
    output::field("failed", summary.failed_logins, 10);
    output::field("users", summary.unique_users, 10);
    output::breakdown("By login type", &summary.logins_by_type);
}
