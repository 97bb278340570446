//! HTTP client for the Gemini `generateContent` API.
//!
//! Wraps a pooled `reqwest::Client` with a configurable timeout and base URL
//! so tests can point it at a local mock.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, warn, Instrument};

use crate::error::{CodegenError, Result};

/// Default hosted API location.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model used for handler generation.
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";

/// Configuration for the Gemini client.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key passed via the `x-goog-api-key` header.
    pub api_key: String,
    /// Model identifier, e.g. `gemini-1.5-pro`.
    pub model: String,
    /// Base URL of the API. Overridable for tests.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Client for text generation against the Gemini REST API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GeminiClient {
    /// Creates a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `CodegenError::MissingApiKey` when no key is configured, or
    /// `CodegenError::Configuration` if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(CodegenError::MissingApiKey);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CodegenError::Configuration(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Generates text from a system instruction and a user prompt.
    ///
    /// Returns the concatenated text parts of the first candidate.
    ///
    /// # Errors
    ///
    /// Returns `CodegenError::Api` for non-success responses and
    /// `CodegenError::EmptyResponse` when the model produced no text.
    pub async fn generate(&self, system: &str, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );

        let request = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: system.to_string() }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: prompt.to_string() }],
            }],
        };

        let span = info_span!("gemini_generate", model = %self.config.model);

        async move {
            debug!(prompt_len = prompt.len(), "Sending generation request");

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.config.api_key)
                .json(&request)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let message = truncate(&response.text().await.unwrap_or_default(), 512);
                warn!(status = status.as_u16(), "Gemini API returned an error");
                return Err(CodegenError::Api { status: status.as_u16(), message });
            }

            let body: GenerateContentResponse = response.json().await?;

            let text = body
                .candidates
                .into_iter()
                .next()
                .and_then(|c| c.content)
                .map(|content| {
                    content.parts.into_iter().map(|p| p.text).collect::<Vec<_>>().join("")
                })
                .unwrap_or_default();

            if text.is_empty() {
                return Err(CodegenError::EmptyResponse);
            }

            debug!(text_len = text.len(), "Generation completed");
            Ok(text)
        }
        .instrument(span)
        .await
    }
}

/// Truncates an error body so it is safe to log and return.
fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}
