//! HTTP request handlers.

pub mod capture;
pub mod generate;
pub mod health;
pub mod webhooks;

pub use capture::{capture_root, capture_webhook};
pub use generate::generate_handler;
pub use health::{health_check, healthy, liveness_check};
pub use webhooks::{delete_webhook, get_webhook, list_webhooks};
