//! Builds the WHERE clause shared by list, count and summary queries.

use rusqlite::types::Value;

use crate::core::models::filter::{LoginFilter, OperationFilter, active};

/// A conjunction of SQL conditions with their bound parameters.
///
/// Column names are compile-time constants; only values are bound.
#[derive(Debug, Default)]
pub struct SqlPredicate {
    clauses: Vec<String>,
    params: Vec<Value>,
}

impl SqlPredicate {
    pub fn new() -> Self {
        Self::default()
    }

    fn bind(&mut self, value: Value) -> String {
        self.params.push(value);
        format!("?{}", self.params.len())
    }

    /// `column = value` when the constraint is set and non-empty.
    pub fn eq(mut self, column: &str, constraint: &Option<String>) -> Self {
        if let Some(value) = active(constraint) {
            let slot = self.bind(Value::Text(value.to_string()));
            self.clauses.push(format!("{column} = {slot}"));
        }
        self
    }

    pub fn eq_text(mut self, column: &str, value: &str) -> Self {
        let slot = self.bind(Value::Text(value.to_string()));
        self.clauses.push(format!("{column} = {slot}"));
        self
    }

    /// Inclusive range, open on whichever side is `None`.
    pub fn within(mut self, column: &str, start: Option<i64>, end: Option<i64>) -> Self {
        if let Some(start) = start {
            let slot = self.bind(Value::Integer(start));
            self.clauses.push(format!("{column} >= {slot}"));
        }
        if let Some(end) = end {
            let slot = self.bind(Value::Integer(end));
            self.clauses.push(format!("{column} <= {slot}"));
        }
        self
    }

    /// `column IN (...)`. An empty set matches nothing.
    pub fn one_of(mut self, column: &str, values: &[String]) -> Self {
        if values.is_empty() {
            self.clauses.push("0".to_string());
            return self;
        }
        let slots: Vec<String> = values
            .iter()
            .map(|v| self.bind(Value::Text(v.clone())))
            .collect();
        self.clauses
            .push(format!("{column} IN ({})", slots.join(", ")));
        self
    }

    /// ` WHERE a AND b`, or an empty string when unconstrained.
    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    /// Placeholder for one more parameter appended after the predicate's own.
    pub fn next_slot(&self, offset: usize) -> String {
        format!("?{}", self.params.len() + offset)
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Predicate parameters followed by `extra`, in binding order.
    pub fn params_with(&self, extra: &[Value]) -> Vec<Value> {
        self.params.iter().chain(extra).cloned().collect()
    }
}

pub fn operation_predicate(filter: &OperationFilter) -> SqlPredicate {
    let predicate = SqlPredicate::new()
        .eq("user_id", &filter.user_id)
        .eq("user_role", &filter.user_role)
        .eq("action", &filter.action)
        .eq("resource_type", &filter.resource_type)
        .eq("ip_address", &filter.ip_address)
        .within("timestamp", filter.start_time, filter.end_time);

    match &filter.user_role_in {
        Some(roles) => predicate.one_of("user_role", roles),
        None => predicate,
    }
}

pub fn login_predicate(filter: &LoginFilter) -> SqlPredicate {
    let predicate = SqlPredicate::new()
        .eq("user_id", &filter.user_id)
        .eq("user_email", &filter.user_email)
        .eq("login_type", &filter.login_type);

    let predicate = match filter.status {
        Some(status) => predicate.eq_text("status", status.as_str()),
        None => predicate,
    };

    predicate
        .eq("ip_address", &filter.ip_address)
        .within("timestamp", filter.start_time, filter.end_time)
}
