pub mod login_log;
pub mod operation_log;

use login_log::LoginLogStore;
use operation_log::OperationLogStore;

/// A backend that holds both relations. Lets the CLI pick a backend at
/// runtime and hand one handle to every command.
pub trait AuditStore: OperationLogStore + LoginLogStore {
    /// Short backend name for diagnostics.
    fn backend_name(&self) -> &'static str;
}
