//! Submission workflow
//!
//! Drives one draft report from photo selection to persistence:
//!
//! ```text
//! AWAITING_PHOTO --capture--> AWAITING_CONFIRMATION --locate/skip--> AWAITING_DETAILS
//!     --submit--> COMPLETED
//! ```
//!
//! Capture composes two independent results. The upload result gates the transition; the
//! classification result only decides what goes into the species field. Upload and insert
//! failures leave the state and the draft untouched so the user can retry.

use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;
use wsw_common::db::ReportStore;
use wsw_common::events::{EventBus, NoticeLevel, WswEvent};
use wsw_common::{Coordinates, Report, ReportDraft};

use super::classifier::{classify_or_fallback, Classification, SpeciesClassifier};
use super::geolocation::LocationProvider;
use super::object_store::{generate_object_name, ObjectStore};
use super::report_snapshot::ReportSnapshot;
use super::ServiceError;
use crate::models::{PhotoUpload, StateTransition, SubmissionDetails, SubmissionState};

const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Submission workflow errors
///
/// Only fatal-to-attempt failures are errors. Classification and geolocation failures are
/// reported through the step outcome instead.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: SubmissionState,
    },

    #[error("No photo provided")]
    EmptyPhoto,

    #[error("Invalid report details: {0}")]
    InvalidDetails(String),

    #[error("Photo upload failed: {0}")]
    Upload(#[source] ServiceError),

    #[error("Report could not be saved: {0}")]
    Storage(#[source] wsw_common::Error),
}

/// Result of a successful capture step
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOutcome {
    pub photo_url: String,
    pub classification: Classification,
}

/// Result of a location request
#[derive(Debug, Clone, PartialEq)]
pub enum LocateOutcome {
    /// Position stored, workflow advanced
    Located(Coordinates),
    /// Position could not be obtained, workflow stays put
    Unavailable(String),
}

/// One in-flight submission
pub struct SubmissionWorkflow {
    object_store: Arc<dyn ObjectStore>,
    classifier: Arc<dyn SpeciesClassifier>,
    report_store: Arc<dyn ReportStore>,
    snapshot: ReportSnapshot,
    event_bus: EventBus,
    state: SubmissionState,
    draft: ReportDraft,
    classification: Option<Classification>,
    submitted: Option<Report>,
}

impl SubmissionWorkflow {
    pub fn new(
        object_store: Arc<dyn ObjectStore>,
        classifier: Arc<dyn SpeciesClassifier>,
        report_store: Arc<dyn ReportStore>,
        snapshot: ReportSnapshot,
        event_bus: EventBus,
    ) -> Self {
        Self {
            object_store,
            classifier,
            report_store,
            snapshot,
            event_bus,
            state: SubmissionState::AwaitingPhoto,
            draft: ReportDraft::default(),
            classification: None,
            submitted: None,
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn draft(&self) -> &ReportDraft {
        &self.draft
    }

    /// Classification of the current photo, if capture has happened
    pub fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }

    /// The persisted report once the workflow is completed
    pub fn submitted(&self) -> Option<&Report> {
        self.submitted.as_ref()
    }

    pub fn snapshot(&self) -> &ReportSnapshot {
        &self.snapshot
    }

    /// Upload the photo, then classify it on a best-effort basis
    ///
    /// Upload failure returns an error and leaves the workflow in `AWAITING_PHOTO`. Once the
    /// upload succeeds the workflow always advances to `AWAITING_CONFIRMATION`.
    pub async fn capture(&mut self, photo: PhotoUpload) -> Result<CaptureOutcome, WorkflowError> {
        self.require(SubmissionState::AwaitingPhoto, "capture a photo")?;
        if photo.bytes.is_empty() {
            return Err(WorkflowError::EmptyPhoto);
        }

        let mime_type = photo
            .content_type
            .clone()
            .filter(|ct| ct.starts_with("image/"))
            .or_else(|| infer::get(&photo.bytes).map(|kind| kind.mime_type().to_string()))
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());
        let object_name = generate_object_name(&photo.file_name, &photo.bytes);

        let photo_url = match self
            .object_store
            .upload(&object_name, &photo.bytes, &mime_type)
            .await
        {
            Ok(url) => url,
            Err(e) => {
                error!(object = %object_name, error = %e, "Photo upload failed");
                self.notify(NoticeLevel::Error, format!("Photo upload failed: {}", e));
                return Err(WorkflowError::Upload(e));
            }
        };
        info!(url = %photo_url, "Photo uploaded");
        self.draft.photo_url = Some(photo_url.clone());

        let classification =
            classify_or_fallback(self.classifier.as_ref(), &photo.bytes, &mime_type).await;
        self.draft.bird_species = classification.species_text();
        if classification.is_degraded() {
            self.notify(
                NoticeLevel::Info,
                "Species recognition is unavailable, please enter the species manually",
            );
        }
        self.classification = Some(classification.clone());

        self.transition_to(SubmissionState::AwaitingConfirmation);

        Ok(CaptureOutcome {
            photo_url,
            classification,
        })
    }

    /// Replace the suggested species text
    pub fn edit_species(&mut self, species: impl Into<String>) -> Result<(), WorkflowError> {
        match self.state {
            SubmissionState::AwaitingConfirmation | SubmissionState::AwaitingDetails => {
                self.draft.bird_species = species.into();
                Ok(())
            }
            state => Err(WorkflowError::InvalidState {
                action: "edit the species",
                state,
            }),
        }
    }

    /// Ask a provider for the current position
    ///
    /// On success the coordinates are stored and the workflow advances. On failure the user is
    /// notified and the workflow stays in `AWAITING_CONFIRMATION`.
    pub async fn locate(
        &mut self,
        provider: &dyn LocationProvider,
    ) -> Result<LocateOutcome, WorkflowError> {
        self.require(SubmissionState::AwaitingConfirmation, "request a location")?;

        match provider.current_position().await {
            Ok(coordinates) => {
                self.draft.location = Some(coordinates);
                info!(
                    latitude = coordinates.latitude,
                    longitude = coordinates.longitude,
                    "Location captured"
                );
                self.transition_to(SubmissionState::AwaitingDetails);
                Ok(LocateOutcome::Located(coordinates))
            }
            Err(e) => {
                warn!(error = %e, "Location request failed");
                self.notify(
                    NoticeLevel::Info,
                    format!("Could not get your location ({}); retry or skip", e),
                );
                Ok(LocateOutcome::Unavailable(e.to_string()))
            }
        }
    }

    /// Continue without a location
    pub fn skip_location(&mut self) -> Result<(), WorkflowError> {
        self.require(SubmissionState::AwaitingConfirmation, "skip the location")?;
        self.draft.location = None;
        self.transition_to(SubmissionState::AwaitingDetails);
        Ok(())
    }

    /// Persist the draft with the final details
    ///
    /// Invalid details are rejected before touching the draft. On insert failure the details
    /// stay applied, the state stays `AWAITING_DETAILS` and the same draft can be submitted
    /// again.
    pub async fn submit(&mut self, details: SubmissionDetails) -> Result<Report, WorkflowError> {
        self.require(SubmissionState::AwaitingDetails, "submit")?;
        details.validate().map_err(WorkflowError::InvalidDetails)?;
        details.apply_to(&mut self.draft);

        let report = match self.report_store.insert(self.draft.clone()).await {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "Report insert failed");
                self.notify(NoticeLevel::Error, format!("Report could not be saved: {}", e));
                return Err(WorkflowError::Storage(e));
            }
        };

        info!(report_id = %report.id, species = %report.bird_species, "Report submitted");
        self.submitted = Some(report.clone());
        self.transition_to(SubmissionState::Completed);
        self.event_bus.emit_lossy(WswEvent::ReportSubmitted {
            report_id: report.id,
            timestamp: chrono::Utc::now(),
        });

        if let Err(e) = self.snapshot.refresh(self.report_store.as_ref()).await {
            warn!(error = %e, "Report list refresh failed after submission");
            self.notify(
                NoticeLevel::Info,
                "Your report was saved but the report list could not be refreshed",
            );
        }

        Ok(report)
    }

    /// Discard the draft and start over
    pub fn reset(&mut self) {
        self.draft = ReportDraft::default();
        self.classification = None;
        self.submitted = None;
        if self.state != SubmissionState::AwaitingPhoto {
            self.transition_to(SubmissionState::AwaitingPhoto);
        }
    }

    /// Id of the persisted report, if any
    pub fn submitted_id(&self) -> Option<Uuid> {
        self.submitted.as_ref().map(|r| r.id)
    }

    fn require(&self, expected: SubmissionState, action: &'static str) -> Result<(), WorkflowError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(WorkflowError::InvalidState {
                action,
                state: self.state,
            })
        }
    }

    fn transition_to(&mut self, new_state: SubmissionState) -> StateTransition {
        let transition = StateTransition {
            old_state: self.state,
            new_state,
            transitioned_at: chrono::Utc::now(),
        };
        self.state = new_state;

        info!(
            old_state = %transition.old_state,
            new_state = %transition.new_state,
            "Submission state changed"
        );
        self.event_bus.emit_lossy(WswEvent::SubmissionStateChanged {
            old_state: transition.old_state.to_string(),
            new_state: transition.new_state.to_string(),
            timestamp: transition.transitioned_at,
        });

        transition
    }

    fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        self.event_bus.emit_lossy(WswEvent::notice(level, message));
    }
}
