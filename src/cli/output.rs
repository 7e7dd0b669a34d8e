use std::collections::BTreeMap;

use colored::Colorize;
use serde::Serialize;

use crate::core::errors::{AuditLogError, Result};

/// Print a success message.
pub fn success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

/// Print a warning message.
pub fn warning(msg: &str) {
    println!("  {} {}", "⚠".yellow(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("  {} {}", "✗".red(), msg);
}

/// Print a header line.
pub fn header(msg: &str) {
    println!("\n{}", msg.bold());
}

/// Print a value as pretty JSON on stdout.
pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| AuditLogError::Query {
        detail: format!("Failed to render JSON: {e}"),
    })?;
    println!("{text}");
    Ok(())
}

/// Print a `label: value` line with the label padded to `width`.
pub fn field(label: &str, value: impl std::fmt::Display, width: usize) {
    println!("  {:<width$} {}", format!("{label}:").dimmed(), value);
}

/// Print one grouping of a summary, largest groups first.
pub fn breakdown(title: &str, groups: &BTreeMap<String, u64>) {
    println!("\n  {}", title.bold());
    if groups.is_empty() {
        println!("    {}", "none".dimmed());
        return;
    }

    let mut rows: Vec<_> = groups.iter().collect();
    rows.sort_by(|(ka, na), (kb, nb)| nb.cmp(na).then_with(|| ka.cmp(kb)));

    let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, n) in rows {
        println!("    {key:<width$}  {n}");
    }
}

/// Render an epoch-seconds timestamp as UTC wall time.
pub fn timestamp(secs: i64) -> String {
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| secs.to_string())
}

/// Placeholder for absent optional values in tables.
pub fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "—".dimmed().to_string(),
    }
}
