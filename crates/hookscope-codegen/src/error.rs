//! Error types for handler generation.

use thiserror::Error;

/// Result type alias using `CodegenError`.
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Errors from the Gemini generation pipeline.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// No API key was configured.
    #[error("Gemini API key is not configured")]
    MissingApiKey,

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Configuration(String),

    /// Transport-level failure talking to the API.
    #[error("Gemini request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Gemini API error: {status}: {message}")]
    Api {
        /// HTTP status code returned by the API.
        status: u16,
        /// Error body, truncated for logging.
        message: String,
    },

    /// The API answered 2xx but produced no usable text.
    #[error("Gemini response contained no generated text")]
    EmptyResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_includes_status_and_message() {
        let err = CodegenError::Api { status: 429, message: "quota exceeded".to_string() };
        assert_eq!(err.to_string(), "Gemini API error: 429: quota exceeded");
    }
}
