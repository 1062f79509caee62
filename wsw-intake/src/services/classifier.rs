//! Species classification
//!
//! Classification is best-effort. [`classify_or_fallback`] is the only way the workflow calls a
//! classifier, and it cannot fail: every error becomes [`Classification::Unavailable`], whose
//! species text is the fixed fallback sentinel.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::ServiceError;

/// Text the service is told to return for photos without a bird
pub const NOT_A_BIRD: &str = "not a bird";

/// Species text stored when recognition failed
pub const RECOGNITION_FAILED: &str = "Recognition failed, please enter manually";

/// Fixed instruction sent with every image
pub const CLASSIFY_INSTRUCTION: &str = "Identify the species of the bird in this photo. \
Reply with only the common name followed by your confidence as a percentage in parentheses, \
for example: Taiwan Barbet (95%). If the photo does not show a bird, reply with exactly: not a bird";

/// Image recognition service
#[async_trait]
pub trait SpeciesClassifier: Send + Sync {
    /// Free-text answer to `instruction` about `image`
    async fn classify(
        &self,
        image: &[u8],
        mime_type: &str,
        instruction: &str,
    ) -> Result<String, ServiceError>;
}

/// Outcome of the best-effort classification step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Classification {
    /// Service answered with a species, e.g. "五色鳥 (95%)"
    Identified(String),
    /// Service answered that the photo shows no bird
    NotABird,
    /// Service failed; carries the reason for logs
    Unavailable(String),
}

impl Classification {
    /// Interpret a raw service answer
    pub fn from_response(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            Classification::Unavailable("empty response".to_string())
        } else if text.trim_end_matches('.').eq_ignore_ascii_case(NOT_A_BIRD) {
            Classification::NotABird
        } else {
            Classification::Identified(text.to_string())
        }
    }

    /// Text written into the draft's species field
    pub fn species_text(&self) -> String {
        match self {
            Classification::Identified(text) => text.clone(),
            Classification::NotABird => NOT_A_BIRD.to_string(),
            Classification::Unavailable(_) => RECOGNITION_FAILED.to_string(),
        }
    }

    /// True when the user should be told to fill in the species themselves
    pub fn is_degraded(&self) -> bool {
        matches!(self, Classification::Unavailable(_))
    }
}

/// Run the classifier, converting any failure into [`Classification::Unavailable`]
pub async fn classify_or_fallback(
    classifier: &dyn SpeciesClassifier,
    image: &[u8],
    mime_type: &str,
) -> Classification {
    match classifier
        .classify(image, mime_type, CLASSIFY_INSTRUCTION)
        .await
    {
        Ok(text) => {
            let classification = Classification::from_response(&text);
            info!(result = ?classification, "Species classification finished");
            classification
        }
        Err(e) => {
            warn!(error = %e, "Species classification failed, using fallback text");
            Classification::Unavailable(e.to_string())
        }
    }
}

/// Classifier used when no service is configured; always unavailable
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredClassifier;

#[async_trait]
impl SpeciesClassifier for UnconfiguredClassifier {
    async fn classify(
        &self,
        _image: &[u8],
        _mime_type: &str,
        _instruction: &str,
    ) -> Result<String, ServiceError> {
        Err(ServiceError::Classification(
            "no classification service configured".to_string(),
        ))
    }
}
