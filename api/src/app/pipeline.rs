//! Promotion pipeline
//!
//! Runs the language analyzer and the rules analyzer over the same commit
//! batch and concatenates their output, language promotions first.

use std::sync::Arc;

use crate::domain::entities::{Commit, Promotion};
use crate::domain::ports::Analyzer;
use crate::error::DomainError;

/// Coordinates the two analyzers
pub struct PromotionPipeline<LA, RA>
where
    LA: Analyzer,
    RA: Analyzer,
{
    language: Arc<LA>,
    rules: Arc<RA>,
}

impl<LA, RA> PromotionPipeline<LA, RA>
where
    LA: Analyzer,
    RA: Analyzer,
{
    pub fn new(language: Arc<LA>, rules: Arc<RA>) -> Self {
        Self { language, rules }
    }

    /// Analyze a batch. Any analyzer failure aborts the whole call.
    pub fn analyze(&self, commits: &[Commit]) -> Result<Vec<Promotion>, DomainError> {
        let mut promotions = run(self.language.as_ref(), commits)?;
        promotions.extend(run(self.rules.as_ref(), commits)?);

        tracing::info!(
            commits = commits.len(),
            promotions = promotions.len(),
            "Commit batch analyzed"
        );

        Ok(promotions)
    }
}

fn run<A: Analyzer>(analyzer: &A, commits: &[Commit]) -> Result<Vec<Promotion>, DomainError> {
    analyzer.analyze(commits).inspect_err(|e| {
        tracing::error!(analyzer = analyzer.name(), error = %e, "Analyzer failed");
    })
}
