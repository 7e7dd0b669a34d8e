pub mod init;
pub mod logins;
pub mod ops;
pub mod record;
