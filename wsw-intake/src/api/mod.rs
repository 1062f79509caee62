//! HTTP API handlers for wsw-intake

pub mod health;
pub mod reports;
pub mod sse;
pub mod submission;

pub use health::health_routes;
pub use reports::report_routes;
pub use sse::event_stream;
pub use submission::submission_routes;
