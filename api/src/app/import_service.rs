//! Import service
//!
//! Rebuilds a repository's full history as normalized commits:
//! 1. page through the commit listing until an empty page,
//! 2. fetch commit details in fixed-size windows. Every request of a window
//!    runs concurrently and the next window starts only after the whole
//!    window has finished.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;

use crate::app::cancel::CancelSignal;
use crate::domain::entities::{Commit, CommitDetail, CommitRef};
use crate::domain::ports::CommitSource;
use crate::error::{GithubError, ImportError};

/// What to do when a commit detail cannot be fetched after all retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Abort the whole import
    #[default]
    FailFast,
    /// Record the failure in the report and keep going
    Partial,
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailurePolicy::FailFast => write!(f, "fail-fast"),
            FailurePolicy::Partial => write!(f, "partial"),
        }
    }
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail-fast" | "fail_fast" => Ok(FailurePolicy::FailFast),
            "partial" => Ok(FailurePolicy::Partial),
            _ => Err(format!("Unknown failure policy: {}", s)),
        }
    }
}

/// Tuning knobs for an import
#[derive(Debug, Clone)]
pub struct ImportSettings {
    /// Commits requested per listing page
    pub page_size: u32,
    /// Detail requests in flight per window
    pub concurrency: usize,
    /// Stop listing after this many pages
    pub max_pages: Option<u32>,
    /// Retries per request for transient errors
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further attempt
    pub retry_backoff: Duration,
    pub failure_policy: FailurePolicy,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            page_size: 50,
            concurrency: 20,
            max_pages: None,
            max_retries: 2,
            retry_backoff: Duration::from_millis(250),
            failure_policy: FailurePolicy::FailFast,
        }
    }
}

/// A commit whose detail could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedCommit {
    pub sha: String,
    pub reason: String,
}

/// Outcome of an import
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub repository: String,
    /// Normalized commits, in listing order
    pub commits: Vec<Commit>,
    pub failed: Vec<FailedCommit>,
    /// Commits dropped because no author identity could be resolved
    pub skipped: Vec<String>,
}

impl ImportReport {
    fn new(repository: &str) -> Self {
        Self {
            repository: repository.to_string(),
            ..Self::default()
        }
    }

    /// IDs of the commits that were imported
    pub fn succeeded(&self) -> impl Iterator<Item = &str> {
        self.commits.iter().map(|c| c.id.as_str())
    }

    fn record(&mut self, detail: CommitDetail) {
        let commit = detail.into_commit();
        if commit.user.is_empty() {
            tracing::warn!(commit = %commit.id, "Commit has no author identity, skipping");
            self.skipped.push(commit.id);
        } else {
            self.commits.push(commit);
        }
    }
}

/// Service importing a repository's history through a [`CommitSource`]
pub struct ImportService {
    source: Arc<dyn CommitSource>,
    settings: ImportSettings,
}

impl ImportService {
    pub fn new(source: Arc<dyn CommitSource>, settings: ImportSettings) -> Self {
        Self { source, settings }
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Import every commit of `repo` (e.g. `owner/name`).
    ///
    /// Listing failures are always fatal. Detail failures follow the
    /// configured [`FailurePolicy`]. Cancelling `cancel` stops new windows
    /// from being dispatched and drops the requests in flight.
    pub async fn import(
        &self,
        repo: &str,
        cancel: &CancelSignal,
    ) -> Result<ImportReport, ImportError> {
        tracing::info!(
            repo = %repo,
            page_size = self.settings.page_size,
            concurrency = self.settings.concurrency,
            policy = %self.settings.failure_policy,
            "Starting import"
        );

        let refs = self.list_all(repo, cancel).await?;
        tracing::info!(repo = %repo, commits = refs.len(), "Commit listing complete");

        let report = self.fetch_all(repo, &refs, cancel).await?;
        tracing::info!(
            repo = %repo,
            imported = report.commits.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            "Import complete"
        );

        Ok(report)
    }

    async fn list_all(
        &self,
        repo: &str,
        cancel: &CancelSignal,
    ) -> Result<Vec<CommitRef>, ImportError> {
        let per_page = self.settings.page_size.max(1);
        let mut refs = Vec::new();
        let mut page = 1;

        loop {
            if let Some(max_pages) = self.settings.max_pages {
                if page > max_pages {
                    tracing::warn!(repo = %repo, max_pages, "Page limit reached, listing truncated");
                    break;
                }
            }
            if cancel.is_cancelled() {
                return Err(ImportError::Cancelled);
            }

            let listing = self.with_retry(move || self.source.list_commits(repo, page, per_page));
            let batch = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ImportError::Cancelled),
                result = listing => result.map_err(|source| ImportError::Listing {
                    repo: repo.to_string(),
                    page,
                    source,
                })?,
            };

            tracing::debug!(repo = %repo, page, count = batch.len(), "Fetched commit page");
            if batch.is_empty() {
                break;
            }
            refs.extend(batch);
            page += 1;
        }

        Ok(refs)
    }

    async fn fetch_all(
        &self,
        repo: &str,
        refs: &[CommitRef],
        cancel: &CancelSignal,
    ) -> Result<ImportReport, ImportError> {
        let mut report = ImportReport::new(repo);

        for (index, window) in refs.chunks(self.settings.concurrency.max(1)).enumerate() {
            if cancel.is_cancelled() {
                return Err(ImportError::Cancelled);
            }
            tracing::debug!(window = index + 1, size = window.len(), "Dispatching fetch window");

            let fetches = join_all(window.iter().map(|commit_ref| self.fetch_one(commit_ref)));
            let results = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ImportError::Cancelled),
                results = fetches => results,
            };

            for (commit_ref, result) in window.iter().zip(results) {
                match result {
                    Ok(detail) => report.record(detail),
                    Err(source) => match self.settings.failure_policy {
                        FailurePolicy::FailFast => {
                            return Err(ImportError::Fetch {
                                sha: commit_ref.sha.clone(),
                                source,
                            });
                        }
                        FailurePolicy::Partial => {
                            tracing::warn!(
                                commit = %commit_ref.sha,
                                error = %source,
                                "Commit fetch failed, continuing"
                            );
                            report.failed.push(FailedCommit {
                                sha: commit_ref.sha.clone(),
                                reason: source.to_string(),
                            });
                        }
                    },
                }
            }
        }

        Ok(report)
    }

    async fn fetch_one(&self, commit_ref: &CommitRef) -> Result<CommitDetail, GithubError> {
        self.with_retry(move || self.source.get_commit(commit_ref))
            .await
    }

    /// Run `call`, retrying transient errors with exponential backoff
    async fn with_retry<T, F, Fut>(&self, mut call: F) -> Result<T, GithubError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GithubError>>,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.settings.max_retries => {
                    let delay = self
                        .settings
                        .retry_backoff
                        .saturating_mul(2u32.saturating_pow(attempt));
                    attempt += 1;
                    tracing::warn!(
                        error = %e,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Transient GitHub error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
