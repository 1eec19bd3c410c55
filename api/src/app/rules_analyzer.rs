//! Rules analyzer
//!
//! Every rule that matches a commit produces its own promotion. Nothing is
//! deduplicated: each matching (commit, rule) pair is a separate award.

use std::sync::Arc;

use crate::domain::entities::{Commit, Promotion, RuleSet};
use crate::domain::ports::Analyzer;
use crate::error::DomainError;

/// Applies configured path rules to commits
pub struct RulesAnalyzer {
    source: String,
    rules: Arc<RuleSet>,
}

impl RulesAnalyzer {
    pub fn new(source: impl Into<String>, rules: Arc<RuleSet>) -> Self {
        Self {
            source: source.into(),
            rules,
        }
    }

    fn analyze_commit(&self, commit: &Commit, promotions: &mut Vec<Promotion>) {
        for rule in self.rules.iter().filter(|rule| rule.matches(commit)) {
            tracing::debug!(commit = %commit.id, tag = rule.tag(), "Rule matched");
            promotions.push(Promotion::new(
                &self.source,
                &commit.user,
                rule.tag(),
                rule.amount(),
            ));
        }
    }
}

impl Analyzer for RulesAnalyzer {
    fn name(&self) -> &'static str {
        "rules"
    }

    /// Commit order outer, rule order inner
    fn analyze(&self, commits: &[Commit]) -> Result<Vec<Promotion>, DomainError> {
        let mut promotions = Vec::new();
        for commit in commits {
            self.analyze_commit(commit, &mut promotions);
        }
        Ok(promotions)
    }
}
