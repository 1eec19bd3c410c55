//! Commit domain entity
//!
//! The normalized shape both analyzers consume, regardless of whether the
//! commit arrived in a push webhook or was fetched during an import.

use serde::{Deserialize, Serialize};

/// Author identity as reported by the git host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl CommitAuthor {
    /// Stable user identifier: username, else email, else display name.
    ///
    /// Both the webhook and the import path resolve identities through this,
    /// so the same person maps to the same user across sources.
    pub fn identity(&self) -> Option<&str> {
        [&self.username, &self.email, &self.name]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .map(str::trim)
            .find(|value| !value.is_empty())
    }
}

/// A normalized commit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub id: String,
    pub user: String,
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub removed: Vec<String>,
    pub message: String,
    pub timestamp: Option<String>,
}

impl Commit {
    /// Paths eligible for tagging: added first, then modified.
    /// Removed paths are never scanned.
    pub fn touched_paths(&self) -> impl Iterator<Item = &str> {
        self.added
            .iter()
            .chain(self.modified.iter())
            .map(String::as_str)
    }
}

/// Per-file change status reported by the commit detail endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    #[serde(other)]
    Other,
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileStatus::Added => write!(f, "added"),
            FileStatus::Modified => write!(f, "modified"),
            FileStatus::Removed => write!(f, "removed"),
            FileStatus::Other => write!(f, "other"),
        }
    }
}

/// A changed file inside a commit detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    pub status: FileStatus,
}

/// Reference to a commit returned by the paginated listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRef {
    pub sha: String,
    pub url: String,
}

/// A commit detail as fetched from the remote API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitDetail {
    pub sha: String,
    pub author: CommitAuthor,
    pub message: String,
    pub timestamp: Option<String>,
    pub files: Vec<ChangedFile>,
}

impl CommitDetail {
    /// Convert into the normalized shape, splitting files by status.
    ///
    /// Files with any status other than added/modified/removed (renamed,
    /// copied, ...) are dropped.
    pub fn into_commit(self) -> Commit {
        let mut commit = Commit {
            user: self.author.identity().unwrap_or_default().to_string(),
            id: self.sha,
            message: self.message,
            timestamp: self.timestamp,
            ..Commit::default()
        };

        for file in self.files {
            match file.status {
                FileStatus::Added => commit.added.push(file.filename),
                FileStatus::Modified => commit.modified.push(file.filename),
                FileStatus::Removed => commit.removed.push(file.filename),
                FileStatus::Other => {}
            }
        }

        commit
    }
}
