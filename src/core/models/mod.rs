pub mod filter;
pub mod login_event;
pub mod operation_event;
pub mod origin;
pub mod summary;
pub mod vocabulary;
