//! Database access: initialization and the report record store

pub mod init;
pub mod reports;

pub use init::{connect_in_memory, init_database};
pub use reports::{ReportStore, SqliteReportStore};
