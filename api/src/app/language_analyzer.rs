//! Language analyzer
//!
//! Awards one promotion per (user, language) pair found in a commit batch.
//! Many files in the same language, across any number of commits, still
//! count once per user.

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::entities::{Commit, LanguageTable, Promotion};
use crate::domain::ports::Analyzer;
use crate::error::DomainError;

/// Detects programming languages by file extension
pub struct LanguageAnalyzer {
    source: String,
    amount: f64,
    languages: Arc<LanguageTable>,
}

impl LanguageAnalyzer {
    /// Analyzer over the built-in language table
    pub fn new(source: impl Into<String>, amount: f64) -> Self {
        Self::with_table(source, amount, Arc::new(LanguageTable::builtin()))
    }

    pub fn with_table(source: impl Into<String>, amount: f64, languages: Arc<LanguageTable>) -> Self {
        Self {
            source: source.into(),
            amount,
            languages,
        }
    }
}

impl Analyzer for LanguageAnalyzer {
    fn name(&self) -> &'static str {
        "language"
    }

    fn analyze(&self, commits: &[Commit]) -> Result<Vec<Promotion>, DomainError> {
        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        let mut promotions = Vec::new();

        for commit in commits {
            for path in commit.touched_paths() {
                let Some(tag) = self.languages.detect(path) else {
                    continue;
                };
                if seen.insert((commit.user.as_str(), tag)) {
                    promotions.push(Promotion::new(&self.source, &commit.user, tag, self.amount));
                }
            }
        }

        tracing::debug!(
            commits = commits.len(),
            promotions = promotions.len(),
            "Language analysis complete"
        );

        Ok(promotions)
    }
}
