//! Commit source port trait
//!
//! Defines the interface for reading a repository's history from a remote
//! git host during a full import.

use async_trait::async_trait;

use crate::domain::entities::{CommitDetail, CommitRef};
use crate::error::GithubError;

/// Port trait for paginated commit listing and per-commit detail fetches
#[async_trait]
pub trait CommitSource: Send + Sync {
    /// List one page of commit references (`page` starts at 1).
    /// An empty page means the listing is exhausted.
    async fn list_commits(
        &self,
        repo: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<CommitRef>, GithubError>;

    /// Fetch author and changed files of a single commit
    async fn get_commit(&self, commit: &CommitRef) -> Result<CommitDetail, GithubError>;
}
