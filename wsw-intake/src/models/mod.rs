//! Data models for wsw-intake

pub mod submission;

pub use submission::{PhotoUpload, StateTransition, SubmissionDetails, SubmissionState};
