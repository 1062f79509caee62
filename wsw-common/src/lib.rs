//! # WSW Common Library
//!
//! Shared code for the Window Strike Watch services:
//! - Report entity and its enums
//! - Record store (SQLite) and database initialization
//! - Statistics aggregation over the report collection
//! - Event types (WswEvent) and EventBus
//! - Configuration loading

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod report;
pub mod stats;

pub use error::{Error, Result};
pub use report::{Coordinates, Report, ReportDraft, StrikeStatus, WindowType};
pub use stats::{summarize, StatisticsSummary};
