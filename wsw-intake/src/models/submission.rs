//! Submission workflow states and step inputs
//!
//! A submission progresses through four states:
//! AWAITING_PHOTO → AWAITING_CONFIRMATION → AWAITING_DETAILS → COMPLETED

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use wsw_common::{ReportDraft, StrikeStatus, WindowType};

/// Submission workflow state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionState {
    /// No photo uploaded yet
    #[default]
    AwaitingPhoto,
    /// Photo stored; species suggestion and location pending confirmation
    AwaitingConfirmation,
    /// Location settled; waiting for status, window type and free-text details
    AwaitingDetails,
    /// Report persisted
    Completed,
}

impl SubmissionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionState::AwaitingPhoto => "AWAITING_PHOTO",
            SubmissionState::AwaitingConfirmation => "AWAITING_CONFIRMATION",
            SubmissionState::AwaitingDetails => "AWAITING_DETAILS",
            SubmissionState::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State transition record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub old_state: SubmissionState,
    pub new_state: SubmissionState,
    pub transitioned_at: DateTime<Utc>,
}

/// Image selected by the user
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub bytes: Vec<u8>,
    /// Original file name; only its extension is used
    pub file_name: String,
    pub content_type: Option<String>,
}

/// Final step input; `None` keeps whatever the draft already holds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionDetails {
    pub status: Option<StrikeStatus>,
    pub window_type: Option<WindowType>,
    pub reporter_name: Option<String>,
    pub description: Option<String>,
}

impl SubmissionDetails {
    /// Reject values a new report may not carry
    ///
    /// `Unknown` only exists for reading unrecognized stored rows.
    pub fn validate(&self) -> Result<(), String> {
        if self.status == Some(StrikeStatus::Unknown) {
            return Err("status must be one of dead, stunned, injured".to_string());
        }
        if self.window_type == Some(WindowType::Unknown) {
            return Err(
                "window_type must be one of clear_glass, reflective_glass, mirrored".to_string(),
            );
        }
        Ok(())
    }

    /// Copy the provided fields onto a draft
    pub fn apply_to(&self, draft: &mut ReportDraft) {
        if let Some(status) = self.status {
            draft.status = status;
        }
        if let Some(window_type) = self.window_type {
            draft.window_type = window_type;
        }
        if let Some(name) = &self.reporter_name {
            draft.reporter_name = name.clone();
        }
        if let Some(description) = &self.description {
            draft.description = description.clone();
        }
    }
}
