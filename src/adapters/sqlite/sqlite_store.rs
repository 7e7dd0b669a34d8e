use std::path::Path;

use rusqlite::Connection;

use super::pool::{ReadPool, WriteConnection};
use super::{login_queries, operation_queries, schema};
use crate::core::errors::Result;
use crate::core::models::filter::{LoginFilter, OperationFilter, Page, TimeWindow};
use crate::core::models::login_event::LoginEvent;
use crate::core::models::operation_event::OperationEvent;
use crate::core::models::summary::{LoginSummary, OperationSummary};
use crate::core::traits::AuditStore;
use crate::core::traits::login_log::LoginLogStore;
use crate::core::traits::operation_log::OperationLogStore;

/// SQLite-backed store holding both relations in one database file.
///
/// File-backed stores read through a pool of read-only connections so
/// queries never wait on inserts. In-memory stores (tests) route every
/// call through the writer, since separate in-memory connections would
/// each see their own empty database.
pub struct SqliteStore {
    writer: WriteConnection,
    readers: Option<ReadPool>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and migrate it.
    pub fn open(path: &Path, readers: usize) -> Result<Self> {
        let writer = WriteConnection::open(path)?;
        writer.with_conn(schema::migrate)?;
        let readers = ReadPool::open(path, readers)?;
        tracing::info!(path = %path.display(), readers = readers.size(), "sqlite store opened");
        Ok(Self {
            writer,
            readers: Some(readers),
        })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let writer = WriteConnection::open_in_memory()?;
        writer.with_conn(schema::migrate)?;
        Ok(Self {
            writer,
            readers: None,
        })
    }

    fn with_reader<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        match &self.readers {
            Some(pool) => pool.with_conn(f),
            None => self.writer.with_conn(f),
        }
    }
}

impl OperationLogStore for SqliteStore {
    fn insert_operation(&self, event: &OperationEvent) -> Result<()> {
        self.writer
            .with_conn(|conn| operation_queries::insert(conn, event))
            .inspect_err(|e| tracing::warn!(id = %event.id, error = %e, "operation insert failed"))
    }

    fn list_operations(
        &self,
        filter: &OperationFilter,
        page: Page,
    ) -> Result<Vec<OperationEvent>> {
        self.with_reader(|conn| operation_queries::list(conn, filter, page))
            .inspect_err(|e| tracing::warn!(error = %e, "operation query failed"))
    }

    fn count_operations(&self, filter: &OperationFilter) -> Result<u64> {
        self.with_reader(|conn| operation_queries::count(conn, filter))
            .inspect_err(|e| tracing::warn!(error = %e, "operation count failed"))
    }

    fn summarize_operations(&self, window: TimeWindow) -> Result<OperationSummary> {
        self.with_reader(|conn| operation_queries::summarize(conn, window))
            .inspect_err(|e| tracing::warn!(error = %e, "operation summary failed"))
    }
}

impl LoginLogStore for SqliteStore {
    fn insert_login(&self, event: &LoginEvent) -> Result<()> {
        self.writer
            .with_conn(|conn| login_queries::insert(conn, event))
            .inspect_err(|e| tracing::warn!(id = %event.id, error = %e, "login insert failed"))
    }

    fn list_logins(&self, filter: &LoginFilter, page: Page) -> Result<Vec<LoginEvent>> {
        self.with_reader(|conn| login_queries::list(conn, filter, page))
            .inspect_err(|e| tracing::warn!(error = %e, "login query failed"))
    }

    fn count_logins(&self, filter: &LoginFilter) -> Result<u64> {
        self.with_reader(|conn| login_queries::count(conn, filter))
            .inspect_err(|e| tracing::warn!(error = %e, "login count failed"))
    }

    fn summarize_logins(&self, window: TimeWindow) -> Result<LoginSummary> {
        self.with_reader(|conn| login_queries::summarize(conn, window))
            .inspect_err(|e| tracing::warn!(error = %e, "login summary failed"))
    }
}

impl AuditStore for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
