//! Services for wsw-intake
//!
//! External collaborators of the submission workflow sit behind traits so the workflow can be
//! exercised with fakes:
//! - [`ObjectStore`]: photo upload, returns a public URL
//! - [`SpeciesClassifier`]: best-effort species recognition
//! - [`LocationProvider`]: single-shot position fix
//! - [`wsw_common::db::ReportStore`]: report persistence

pub mod classifier;
pub mod gemini_client;
pub mod geolocation;
pub mod object_store;
pub mod report_snapshot;
pub mod submission_workflow;

pub use classifier::{classify_or_fallback, Classification, SpeciesClassifier, UnconfiguredClassifier};
pub use gemini_client::GeminiClassifier;
pub use geolocation::{LocationProvider, ReportedPosition};
pub use object_store::{generate_object_name, LocalObjectStore, ObjectStore};
pub use report_snapshot::ReportSnapshot;
pub use submission_workflow::{CaptureOutcome, LocateOutcome, SubmissionWorkflow, WorkflowError};

use thiserror::Error;

/// Failure reported by an external collaborator
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("Location unavailable: {0}")]
    Location(String),
}
