//! Hookscope HTTP API.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::{sync::Arc, time::Duration};

use hookscope_codegen::GeminiClient;
use hookscope_core::storage::Storage;

pub mod config;
pub mod error;
pub mod handlers;
pub mod server;

pub use config::Config;
pub use error::ApiError;
pub use server::{create_router, start_server};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Database access layer.
    pub storage: Storage,
    /// Client for handler code generation.
    pub codegen: Arc<GeminiClient>,
    /// Maximum accepted capture body size in bytes.
    pub max_body_bytes: usize,
    /// Timeout applied to every request.
    pub request_timeout: Duration,
}

impl AppState {
    /// Creates the application state.
    pub fn new(
        storage: Storage,
        codegen: GeminiClient,
        max_body_bytes: usize,
        request_timeout: Duration,
    ) -> Self {
        Self { storage, codegen: Arc::new(codegen), max_body_bytes, request_timeout }
    }
}
