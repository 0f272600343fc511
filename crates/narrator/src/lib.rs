//! Client for the generative text API used for harvest summaries and the
//! chat assistant.
//!
//! Wraps a Gemini-style `generateContent` endpoint using [`reqwest`]. The
//! narrator is strictly best-effort: callers surface failures inline as
//! message text rather than failing their own request.

pub mod prompt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default model when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// HTTP client for one generative text API endpoint.
pub struct Narrator {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

/// Errors from the narrator layer.
#[derive(Debug, thiserror::Error)]
pub enum NarratorError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("narrator API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// A 2xx response carried no usable text.
    #[error("narrator returned an empty response")]
    EmptyResponse,
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Pull the first candidate's text out of a response body.
fn extract_text(response: GenerateContentResponse) -> Result<String, NarratorError> {
    response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .find_map(|p| p.text)
        .filter(|t| !t.trim().is_empty())
        .ok_or(NarratorError::EmptyResponse)
}

impl Narrator {
    /// * `api_url` - Base URL, e.g. `https://generativelanguage.googleapis.com/v1beta`.
    pub fn new(api_url: String, api_key: String, model: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate one paragraph of text from a prompt.
    pub async fn generate(&self, prompt: &str) -> Result<String, NarratorError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.api_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NarratorError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text = extract_text(parsed)?;
        debug!(model = %self.model, chars = text.len(), "narrator reply generated");
        Ok(text)
    }
}
