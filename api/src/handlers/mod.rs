//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod import;
pub mod webhooks;

pub use import::import_repository;
pub use webhooks::commit_webhook;

/// GET /ping
pub async fn ping() -> &'static str {
    "pong"
}
