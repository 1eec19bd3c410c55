//! Unified error types for the badge analyzer
//!
//! This module defines error types for each layer:
//! - `DomainError`: Core analysis errors
//! - `RuleError`: Rule set loading and compilation errors
//! - `ConfigError`: Environment configuration errors
//! - `GithubError`: GitHub API client errors
//! - `CollectorError`: Collector API client errors
//! - `ImportError`: Full-history import errors
//! - `AppError`: Application layer errors (wraps the above for HTTP responses)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Domain layer errors - pure analysis errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Rule loading errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Failed to read rules file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse rules: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid pattern {pattern:?} in rule {tag:?}: {source}")]
    InvalidPattern {
        tag: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Rule {tag:?} has invalid amount {amount}")]
    InvalidAmount { tag: String, amount: f64 },

    #[error("Rule #{index} has an empty tag")]
    EmptyTag { index: usize },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Incomplete credentials: {0}")]
    Credentials(String),
}

/// GitHub API client errors
#[derive(Debug, Error)]
pub enum GithubError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Repository or commit not found: {0}")]
    NotFound(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Unauthorized - invalid credentials")]
    Unauthorized,

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl GithubError {
    /// Whether a retry could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            GithubError::Request(_) | GithubError::RateLimited => true,
            GithubError::Api { status, .. } => *status >= 500,
            GithubError::NotFound(_)
            | GithubError::Unauthorized
            | GithubError::Deserialization(_) => false,
        }
    }
}

/// Collector API client errors
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Collector API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Full-history import errors
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to list commits of {repo} (page {page}): {source}")]
    Listing {
        repo: String,
        page: u32,
        #[source]
        source: GithubError,
    },

    #[error("Failed to fetch commit {sha}: {source}")]
    Fetch {
        sha: String,
        #[source]
        source: GithubError,
    },

    #[error("Import cancelled")]
    Cancelled,
}

/// Application layer errors - used by HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Collector error: {0}")]
    Collector(#[from] CollectorError),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

/// Error response body for JSON responses
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

fn github_status(e: &GithubError) -> (StatusCode, &'static str) {
    match e {
        GithubError::NotFound(_) => (StatusCode::NOT_FOUND, "Not found on GitHub"),
        GithubError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "Rate limited"),
        GithubError::Deserialization(_) => (StatusCode::BAD_GATEWAY, "Malformed GitHub response"),
        _ => (StatusCode::BAD_GATEWAY, "GitHub service error"),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Domain(DomainError::Validation(msg)) => (
                StatusCode::BAD_REQUEST,
                "Validation error",
                Some(msg.clone()),
            ),
            AppError::Domain(DomainError::Internal(msg)) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
            AppError::Import(ImportError::Cancelled) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Import cancelled",
                None,
            ),
            AppError::Import(
                ImportError::Listing { source, .. } | ImportError::Fetch { source, .. },
            ) => {
                tracing::error!("Import error: {}", self);
                let (status, error) = github_status(source);
                (status, error, Some(self.to_string()))
            }
            AppError::Collector(e) => {
                tracing::error!("Collector error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "Collector service error",
                    Some(e.to_string()),
                )
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Bad request", Some(msg.clone()))
            }
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            details,
        });

        (status, body).into_response()
    }
}
