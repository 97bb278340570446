//! Handler code generation backed by the Google Gemini API.
//!
//! Turns sampled webhook payload bodies into a drafted TypeScript handler by
//! calling the hosted `generateContent` endpoint.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod prompt;

pub use client::{GeminiClient, GeminiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use error::{CodegenError, Result};
