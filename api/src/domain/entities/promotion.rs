//! Promotion domain entity
//!
//! A promotion awards `amount` points of `tag` to a user. Analyzers create
//! them; the caller owns them afterwards and hands them to the collector.

use serde::{Deserialize, Serialize};

/// An awarded (source, user, tag, amount) tuple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    pub source: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub tag: String,
    pub amount: f64,
}

impl Promotion {
    pub fn new(
        source: impl Into<String>,
        username: impl Into<String>,
        tag: impl Into<String>,
        amount: f64,
    ) -> Self {
        Self {
            source: source.into(),
            username: username.into(),
            avatar_url: None,
            tag: tag.into(),
            amount,
        }
    }

    /// Attach a display avatar, consuming the promotion
    pub fn with_avatar(self, avatar_url: impl Into<String>) -> Self {
        Self {
            avatar_url: Some(avatar_url.into()),
            ..self
        }
    }
}
