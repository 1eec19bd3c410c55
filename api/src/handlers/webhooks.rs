//! Webhook handlers
//!
//! Handler for push webhooks carrying commit batches.

use axum::{body::Bytes, extract::State, http::StatusCode};
use serde::{Deserialize, Deserializer};

use crate::domain::entities::{Commit, CommitAuthor, Promotion};
use crate::error::AppError;
use crate::AppState;

/// Helper to deserialize null as default (empty vec, etc.)
fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

/// Push webhook payload
#[derive(Debug, Deserialize)]
pub struct PushPayload {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub commits: Vec<PushCommit>,
    #[serde(default)]
    pub sender: Option<Sender>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct PushCommit {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub distinct: bool,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub added: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub modified: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub removed: Vec<String>,
    #[serde(default)]
    pub author: CommitAuthor,
    #[serde(default)]
    pub committer: Option<CommitAuthor>,
}

impl PushCommit {
    /// Normalize, or `None` when the author cannot be identified
    fn into_commit(self) -> Option<Commit> {
        let user = self.author.identity()?.to_string();
        Some(Commit {
            id: self.id,
            user,
            added: self.added,
            modified: self.modified,
            removed: self.removed,
            message: self.message,
            timestamp: self.timestamp,
        })
    }
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct Sender {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl PushPayload {
    fn avatar_url(&self) -> Option<&str> {
        self.sender
            .as_ref()
            .and_then(|s| s.avatar_url.as_deref())
            .filter(|url| !url.is_empty())
    }
}

/// Normalize a payload's commits, dropping those without an author identity
pub fn normalize_commits(commits: Vec<PushCommit>) -> Vec<Commit> {
    commits
        .into_iter()
        .filter_map(|commit| {
            let id = commit.id.clone();
            let normalized = commit.into_commit();
            if normalized.is_none() {
                tracing::warn!(commit = %id, "Commit has no author identity, skipping");
            }
            normalized
        })
        .collect()
}

/// Attach the sender's avatar to every promotion
pub fn decorate_avatars(promotions: Vec<Promotion>, avatar_url: Option<&str>) -> Vec<Promotion> {
    match avatar_url {
        Some(url) => promotions.into_iter().map(|p| p.with_avatar(url)).collect(),
        None => promotions,
    }
}

/// POST /commit
///
/// Analyze a pushed commit batch and forward the promotions to the
/// collector. Responds with the collector's response body.
pub async fn commit_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, String), AppError> {
    let payload: PushPayload = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "Failed to parse webhook payload");
        AppError::BadRequest(format!("Invalid JSON: {}", e))
    })?;

    let avatar_url = payload.avatar_url().map(str::to_string);
    let commits = normalize_commits(payload.commits);
    tracing::info!(commits = commits.len(), "Received push webhook");

    let promotions = state.pipeline.analyze(&commits)?;
    if promotions.is_empty() {
        tracing::debug!("No promotions for push");
        return Ok((StatusCode::OK, String::new()));
    }

    let promotions = decorate_avatars(promotions, avatar_url.as_deref());
    tracing::info!(
        user = %promotions[0].username,
        count = promotions.len(),
        "Submitting promotions"
    );

    let response = state.collector.submit(&promotions).await?;
    Ok((StatusCode::OK, response))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::Request,
    };
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::test_utils::{test_app_state, InMemoryCommitSource, RecordingCollector};

    fn push_body() -> serde_json::Value {
        json!({
            "ref": "refs/heads/master",
            "commits": [{
                "id": "aa45b6ee05606d0c62e580bbde433c43ea1136b7",
                "message": "Fix a Heisenbug",
                "timestamp": "2015-05-05T19:40:15-04:00",
                "url": "https://github.com/octo/repo/commit/aa45b6e",
                "distinct": true,
                "added": ["bin/setup.py", "bin/say-hello.sh"],
                "modified": ["etc/app.ini", "etc/rules.yml", "main.go"],
                "removed": [],
                "author": { "name": "Alice", "email": "alice@example.com", "username": "alice" },
                "committer": { "name": "Alice", "email": "alice@example.com", "username": "alice" }
            }],
            "sender": { "login": "alice", "avatar_url": "https://avatars.test/u/1" }
        })
    }

    async fn post(app: axum::Router, body: Vec<u8>) -> (StatusCode, String) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/commit")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn parse_push_payload() {
        let payload: PushPayload = serde_json::from_value(push_body()).unwrap();
        assert_eq!(payload.commits.len(), 1);
        assert_eq!(payload.avatar_url(), Some("https://avatars.test/u/1"));

        let commits = normalize_commits(payload.commits);
        assert_eq!(commits[0].user, "alice");
        assert_eq!(commits[0].added, vec!["bin/setup.py", "bin/say-hello.sh"]);
    }

    #[test]
    fn parse_minimal_payload() {
        let payload: PushPayload = serde_json::from_str(r#"{"commits": null}"#).unwrap();
        assert!(payload.commits.is_empty());
        assert!(payload.avatar_url().is_none());
    }

    #[test]
    fn commits_without_identity_are_dropped() {
        let payload: PushPayload = serde_json::from_value(json!({
            "commits": [
                { "id": "a", "added": ["x.py"], "author": {} },
                { "id": "b", "added": ["y.py"], "author": { "email": "bob@example.com" } }
            ]
        }))
        .unwrap();
        let commits = normalize_commits(payload.commits);
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].user, "bob@example.com");
    }

    #[test]
    fn decorates_every_promotion() {
        let promotions = vec![
            Promotion::new("github", "alice", "python", 2.0),
            Promotion::new("github", "alice", "ruler", 10.0),
        ];
        let decorated = decorate_avatars(promotions.clone(), Some("https://a/1"));
        assert!(decorated
            .iter()
            .all(|p| p.avatar_url.as_deref() == Some("https://a/1")));
        assert_eq!(decorate_avatars(promotions.clone(), None), promotions);
    }

    #[tokio::test]
    async fn analyzes_and_submits_push() {
        let collector = Arc::new(RecordingCollector::new().with_response("stored"));
        let state = test_app_state(Arc::new(InMemoryCommitSource::default()), collector.clone());

        let (status, body) = post(
            crate::build_router(state),
            serde_json::to_vec(&push_body()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "stored");

        let submissions = collector.submissions();
        assert_eq!(submissions.len(), 1);
        let tags: Vec<&str> = submissions[0].iter().map(|p| p.tag.as_str()).collect();
        assert_eq!(tags.len(), 5);
        assert_eq!(&tags[3..], &["ruler", "ninja"]);
        assert!(submissions[0]
            .iter()
            .all(|p| p.username == "alice" && p.avatar_url.as_deref() == Some("https://avatars.test/u/1")));
    }

    #[tokio::test]
    async fn push_without_promotions_submits_nothing() {
        let collector = Arc::new(RecordingCollector::new());
        let state = test_app_state(Arc::new(InMemoryCommitSource::default()), collector.clone());
        let body = json!({
            "commits": [{ "id": "a", "added": ["README"], "author": { "username": "alice" } }]
        });

        let (status, text) = post(crate::build_router(state), serde_json::to_vec(&body).unwrap()).await;

        assert_eq!(status, StatusCode::OK);
        assert!(text.is_empty());
        assert!(collector.submissions().is_empty());
    }

    #[tokio::test]
    async fn malformed_payload_is_rejected() {
        let collector = Arc::new(RecordingCollector::new());
        let state = test_app_state(Arc::new(InMemoryCommitSource::default()), collector.clone());

        let (status, body) = post(crate::build_router(state), b"{\"commits\": [".to_vec()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Bad request"));
        assert!(collector.submissions().is_empty());
    }

    #[tokio::test]
    async fn collector_failure_is_bad_gateway() {
        let collector = Arc::new(RecordingCollector::failing());
        let state = test_app_state(Arc::new(InMemoryCommitSource::default()), collector);

        let (status, _) = post(
            crate::build_router(state),
            serde_json::to_vec(&push_body()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
