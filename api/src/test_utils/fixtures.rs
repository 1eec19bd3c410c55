//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.

use std::sync::Arc;
use std::time::Duration;

use crate::app::{
    CancelSignal, ImportService, ImportSettings, LanguageAnalyzer, PromotionPipeline,
    RulesAnalyzer,
};
use crate::domain::entities::{
    ChangedFile, Commit, CommitAuthor, CommitDetail, CommitRef, FileStatus, RuleSet, RuleSpec,
};
use crate::domain::ports::{Collector, CommitSource};
use crate::AppState;

fn owned(paths: &[&str]) -> Vec<String> {
    paths.iter().map(|p| p.to_string()).collect()
}

/// Create a commit by `user` touching the given paths
pub fn test_commit(user: &str, added: &[&str], modified: &[&str]) -> Commit {
    Commit {
        id: format!("{}-commit", user),
        user: user.to_string(),
        added: owned(added),
        modified: owned(modified),
        removed: Vec::new(),
        message: "Test commit".to_string(),
        timestamp: None,
    }
}

/// The reference commit: two scripts added, config and Go source modified
pub fn alice_commit() -> Commit {
    Commit {
        id: "aa45b6ee05606d0c62e580bbde433c43ea1136b7".to_string(),
        user: "alice".to_string(),
        added: owned(&["bin/setup.py", "bin/say-hello.sh"]),
        modified: owned(&["etc/app.ini", "etc/rules.yml", "main.go"]),
        removed: Vec::new(),
        message: "Fix a Heisenbug".to_string(),
        timestamp: Some("2015-05-05T19:40:15-04:00".to_string()),
    }
}

/// Rule set with `ruler`, `ninja` and `foobariel`
pub fn sample_rules() -> RuleSet {
    let spec = |patterns: &[&str], tag: &str, amount: f64| RuleSpec {
        patterns: owned(patterns),
        tag: tag.to_string(),
        amount,
    };
    RuleSet::compile(vec![
        spec(&["rules", "etc/.*"], "ruler", 10.0),
        spec(&[r"\.py$"], "ninja", 15.0),
        spec(&["etc/foobarmode"], "foobariel", 1050.0),
    ])
    .unwrap()
}

/// SHA of the `index`-th generated commit
pub fn test_sha(index: usize) -> String {
    format!("sha{:03}", index)
}

/// Listing reference for the `index`-th generated commit
pub fn test_ref(index: usize) -> CommitRef {
    let sha = test_sha(index);
    CommitRef {
        url: format!("https://api.github.test/repos/octo/repo/commits/{}", sha),
        sha,
    }
}

/// Commit detail with one file of every status
pub fn test_detail(index: usize) -> CommitDetail {
    let file = |name: String, status| ChangedFile {
        filename: name,
        status,
    };
    CommitDetail {
        sha: test_sha(index),
        author: CommitAuthor {
            name: Some(format!("User {}", index)),
            email: Some(format!("user{}@example.com", index)),
            username: Some(format!("user{}", index)),
        },
        message: format!("Commit {}", index),
        timestamp: None,
        files: vec![
            file(format!("src/new{}.py", index), FileStatus::Added),
            file("main.go".to_string(), FileStatus::Modified),
            file("old.rb".to_string(), FileStatus::Removed),
            file(format!("docs/moved{}.md", index), FileStatus::Other),
        ],
    }
}

/// Application state wired with the sample rules and the given ports
pub fn test_app_state(source: Arc<dyn CommitSource>, collector: Arc<dyn Collector>) -> AppState {
    let settings = ImportSettings {
        page_size: 10,
        retry_backoff: Duration::ZERO,
        ..ImportSettings::default()
    };
    AppState {
        pipeline: Arc::new(PromotionPipeline::new(
            Arc::new(LanguageAnalyzer::new("github", 2.0)),
            Arc::new(RulesAnalyzer::new("github", Arc::new(sample_rules()))),
        )),
        importer: Arc::new(ImportService::new(source, settings)),
        collector,
        shutdown: CancelSignal::new(),
    }
}
