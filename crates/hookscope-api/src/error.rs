//! API error type and HTTP status mapping.
//!
//! Handlers return `Result<_, ApiError>`; the `IntoResponse` impl produces
//! the flat `{"message": "..."}` body the dashboard expects and logs server
//! faults before hiding their details from clients.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hookscope_codegen::CodegenError;
use hookscope_core::CoreError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error description.
    pub message: String,
}

/// Errors produced by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Requested entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Request failed validation.
    #[error("{0}")]
    InvalidInput(String),

    /// Capture body exceeds the configured cap.
    #[error("request body exceeds the {limit} byte capture limit")]
    PayloadTooLarge {
        /// Configured capture body cap in bytes.
        limit: usize,
    },

    /// Handler generation failed.
    #[error(transparent)]
    Codegen(#[from] CodegenError),

    /// Storage layer failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Anything else.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(message) | Self::Core(CoreError::NotFound(message)) => {
                (StatusCode::NOT_FOUND, message)
            },
            Self::InvalidInput(message) => (StatusCode::BAD_REQUEST, message),
            Self::PayloadTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
            Self::Codegen(err @ (CodegenError::MissingApiKey | CodegenError::Configuration(_))) => {
                error!(error = %err, "Codegen misconfiguration");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.".to_string())
            },
            Self::Codegen(err) => {
                warn!(error = %err, "Upstream generation failed");
                (StatusCode::BAD_GATEWAY, "Handler generation failed.".to_string())
            },
            Self::Core(err) => {
                error!(error = %err, "Storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.".to_string())
            },
            Self::Internal(err) => {
                error!(error = %err, "Unhandled failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.".to_string())
            },
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}
