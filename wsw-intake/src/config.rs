//! Configuration resolution for wsw-intake
//!
//! Classifier API key priority: environment → TOML.

use std::sync::Arc;
use tracing::{info, warn};
use wsw_common::config::TomlConfig;

use crate::services::{GeminiClassifier, SpeciesClassifier, UnconfiguredClassifier};

/// Environment variable holding the classifier API key
pub const CLASSIFIER_API_KEY_ENV: &str = "WSW_CLASSIFIER_API_KEY";

/// Resolve the classifier API key, `None` when neither source has a usable one
pub fn resolve_classifier_api_key(toml_config: &TomlConfig) -> Option<String> {
    let env_key = std::env::var(CLASSIFIER_API_KEY_ENV)
        .ok()
        .filter(|k| is_valid_key(k));
    let toml_key = toml_config
        .classifier
        .api_key
        .clone()
        .filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!("Classifier API key found in environment and TOML. Using environment.");
    }

    if let Some(key) = env_key {
        info!("Classifier API key loaded from environment variable");
        return Some(key);
    }
    if let Some(key) = toml_key {
        info!("Classifier API key loaded from TOML config");
        return Some(key);
    }
    None
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Build the classifier for this configuration
///
/// Without a key, or if the HTTP client cannot be built, submissions still work: every photo
/// gets the recognition-failed fallback text.
pub fn build_classifier(toml_config: &TomlConfig) -> Arc<dyn SpeciesClassifier> {
    let Some(api_key) = resolve_classifier_api_key(toml_config) else {
        warn!(
            "Classifier API key not configured (set {} or classifier.api_key); \
             species recognition disabled",
            CLASSIFIER_API_KEY_ENV
        );
        return Arc::new(UnconfiguredClassifier);
    };

    match GeminiClassifier::new(&toml_config.classifier, api_key) {
        Ok(client) => {
            info!(model = %toml_config.classifier.model, "Species classifier ready");
            Arc::new(client)
        }
        Err(e) => {
            warn!(error = %e, "Classifier client could not be built; species recognition disabled");
            Arc::new(UnconfiguredClassifier)
        }
    }
}
