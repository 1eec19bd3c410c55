//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use super::fixtures::{test_detail, test_ref};
use crate::domain::entities::{Commit, CommitAuthor, CommitDetail, CommitRef, Promotion};
use crate::domain::ports::{Analyzer, Collector, CommitSource};
use crate::error::{CollectorError, DomainError, GithubError};

// ============================================================================
// In-Memory Commit Source
// ============================================================================

/// Start/end of a single detail fetch, in the order they happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    Start(String),
    End(String),
}

#[derive(Default)]
pub struct InMemoryCommitSource {
    refs: Vec<CommitRef>,
    details: HashMap<String, CommitDetail>,
    delay: Option<Duration>,
    listing_fails: bool,
    /// sha -> (failures left, transient?)
    failures: RwLock<HashMap<String, (u32, bool)>>,
    pages: RwLock<Vec<u32>>,
    calls: RwLock<HashMap<String, u32>>,
    log: RwLock<Vec<FetchEvent>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl InMemoryCommitSource {
    /// History of `count` generated commits (`sha000`, `sha001`, ...)
    pub fn with_commit_count(count: usize) -> Self {
        Self {
            refs: (0..count).map(test_ref).collect(),
            details: (0..count)
                .map(test_detail)
                .map(|d| (d.sha.clone(), d))
                .collect(),
            ..Self::default()
        }
    }

    /// Delay every detail fetch
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make every listing request fail permanently
    pub fn failing_listing(mut self) -> Self {
        self.listing_fails = true;
        self
    }

    /// Fail the first `times` fetches of `sha`
    pub fn failing_commit(self, sha: &str, times: u32, transient: bool) -> Self {
        {
            let mut failures = self.failures.write().unwrap();
            failures.insert(sha.to_string(), (times, transient));
        }
        self
    }

    /// Strip all author identity from a commit
    pub fn anonymous_commit(mut self, sha: &str) -> Self {
        if let Some(detail) = self.details.get_mut(sha) {
            detail.author = CommitAuthor::default();
        }
        self
    }

    pub fn pages_requested(&self) -> Vec<u32> {
        self.pages.read().unwrap().clone()
    }

    pub fn fetch_log(&self) -> Vec<FetchEvent> {
        self.log.read().unwrap().clone()
    }

    pub fn fetch_calls(&self, sha: &str) -> u32 {
        self.calls.read().unwrap().get(sha).copied().unwrap_or(0)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn take_failure(&self, sha: &str) -> Option<GithubError> {
        let mut failures = self.failures.write().unwrap();
        let (remaining, transient) = failures.get_mut(sha)?;
        if *remaining == 0 {
            return None;
        }
        *remaining -= 1;
        Some(if *transient {
            GithubError::RateLimited
        } else {
            GithubError::NotFound(sha.to_string())
        })
    }
}

#[async_trait]
impl CommitSource for InMemoryCommitSource {
    async fn list_commits(
        &self,
        repo: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<CommitRef>, GithubError> {
        self.pages.write().unwrap().push(page);
        if self.listing_fails {
            return Err(GithubError::NotFound(repo.to_string()));
        }

        let start = (page.saturating_sub(1) * per_page) as usize;
        Ok(self
            .refs
            .iter()
            .skip(start)
            .take(per_page as usize)
            .cloned()
            .collect())
    }

    async fn get_commit(&self, commit: &CommitRef) -> Result<CommitDetail, GithubError> {
        *self
            .calls
            .write()
            .unwrap()
            .entry(commit.sha.clone())
            .or_default() += 1;

        if let Some(err) = self.take_failure(&commit.sha) {
            return Err(err);
        }

        self.log
            .write()
            .unwrap()
            .push(FetchEvent::Start(commit.sha.clone()));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.log
            .write()
            .unwrap()
            .push(FetchEvent::End(commit.sha.clone()));

        self.details
            .get(&commit.sha)
            .cloned()
            .ok_or_else(|| GithubError::NotFound(commit.sha.clone()))
    }
}

// ============================================================================
// Recording Collector
// ============================================================================

#[derive(Default)]
pub struct RecordingCollector {
    submissions: RwLock<Vec<Vec<Promotion>>>,
    should_fail: bool,
    response: String,
}

impl RecordingCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Body returned for every successful submission
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    pub fn submissions(&self) -> Vec<Vec<Promotion>> {
        self.submissions.read().unwrap().clone()
    }
}

#[async_trait]
impl Collector for RecordingCollector {
    async fn submit(&self, promotions: &[Promotion]) -> Result<String, CollectorError> {
        if self.should_fail {
            return Err(CollectorError::Api {
                status: 503,
                message: "Mock failure".to_string(),
            });
        }

        self.submissions.write().unwrap().push(promotions.to_vec());
        Ok(self.response.clone())
    }
}

// ============================================================================
// Failing Analyzer
// ============================================================================

/// Analyzer that always errors
pub struct FailingAnalyzer;

impl Analyzer for FailingAnalyzer {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn analyze(&self, _commits: &[Commit]) -> Result<Vec<Promotion>, DomainError> {
        Err(DomainError::Internal("Mock failure".to_string()))
    }
}
