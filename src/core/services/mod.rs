pub mod access_guard;
pub mod login_log_service;
pub mod operation_log_service;
