use crate::core::errors::Result;
use crate::core::models::filter::{OperationFilter, Page, TimeWindow};
use crate::core::models::operation_event::OperationEvent;
use crate::core::models::summary::OperationSummary;

/// Port for persisting and querying operation events.
///
/// Implementations must apply the same predicate in `list` and `count`,
/// order `list` by timestamp descending (later inserts first among equal
/// timestamps), and compute `summarize` from one consistent read.
pub trait OperationLogStore: Send + Sync {
    /// Durably insert one record. Fails with `Persistence` on duplicate id
    /// or storage failure; nothing is written in that case.
    fn insert_operation(&self, event: &OperationEvent) -> Result<()>;

    /// One page of matching records, newest first.
    fn list_operations(&self, filter: &OperationFilter, page: Page)
    -> Result<Vec<OperationEvent>>;

    /// Number of records matching `filter`, ignoring paging.
    fn count_operations(&self, filter: &OperationFilter) -> Result<u64>;

    /// Statistics over records with `window.start <= timestamp <= window.end`.
    fn summarize_operations(&self, window: TimeWindow) -> Result<OperationSummary>;
}

impl<T: OperationLogStore + ?Sized> OperationLogStore for &T {
    fn insert_operation(&self, event: &OperationEvent) -> Result<()> {
        (**self).insert_operation(event)
    }

    fn list_operations(
        &self,
        filter: &OperationFilter,
        page: Page,
    ) -> Result<Vec<OperationEvent>> {
        (**self).list_operations(filter, page)
    }

    fn count_operations(&self, filter: &OperationFilter) -> Result<u64> {
        (**self).count_operations(filter)
    }

    fn summarize_operations(&self, window: TimeWindow) -> Result<OperationSummary> {
        (**self).summarize_operations(window)
    }
}
