//! Gemini vision client
//!
//! Sends the classification instruction plus the photo as inline base64 data to a
//! `generateContent` endpoint and returns the concatenated text of the first candidate.

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use wsw_common::config::ClassifierConfig;

use super::{ServiceError, SpeciesClassifier};

const USER_AGENT: &str = concat!("wsw-intake/", env!("CARGO_PKG_VERSION"));
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini-backed [`SpeciesClassifier`]
///
/// The API key travels in a header only; error messages never carry the request URL.
#[derive(Clone)]
pub struct GeminiClassifier {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClassifier {
    pub fn new(config: &ClassifierConfig, api_key: String) -> Result<Self, ServiceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ServiceError::Classification(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl std::fmt::Debug for GeminiClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClassifier")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl SpeciesClassifier for GeminiClassifier {
    async fn classify(
        &self,
        image: &[u8],
        mime_type: &str,
        instruction: &str,
    ) -> Result<String, ServiceError> {
        let body = build_request(image, mime_type, instruction);

        tracing::debug!(model = %self.model, image_bytes = image.len(), "Querying classifier");

        let response = self
            .http_client
            .post(self.endpoint())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                ServiceError::Classification(format!("network error: {}", e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ServiceError::Classification(format!(
                "API error {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| {
                ServiceError::Classification(format!("parse error: {}", e.without_url()))
            })?;

        extract_text(parsed)
    }
}

fn build_request(image: &[u8], mime_type: &str, instruction: &str) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts: vec![
                RequestPart::Text {
                    text: instruction.to_string(),
                },
                RequestPart::InlineData {
                    inline_data: InlineData {
                        mime_type: mime_type.to_string(),
                        data: base64::engine::general_purpose::STANDARD.encode(image),
                    },
                },
            ],
        }],
    }
}

fn extract_text(response: GenerateResponse) -> Result<String, ServiceError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::Classification("no candidates returned".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    if text.trim().is_empty() {
        return Err(ServiceError::Classification("empty answer".to_string()));
    }
    Ok(text)
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}
