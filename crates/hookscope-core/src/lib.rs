//! Core domain model for captured webhooks.
//!
//! Provides the strongly-typed webhook record, its time-ordered identifier,
//! error handling, and the repository layer used by the HTTP API. All other
//! crates depend on these foundational types.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod models;
pub mod storage;

pub use error::{CoreError, Result};
pub use models::{NewWebhook, Webhook, WebhookId, WebhookSummary};
