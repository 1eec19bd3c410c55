//! Analyzer port trait
//!
//! Every promotion source (language detection, path rules) implements this
//! one capability; the pipeline depends on nothing else.

use crate::domain::entities::{Commit, Promotion};
use crate::error::DomainError;

/// Derives promotions from a batch of normalized commits
pub trait Analyzer: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Analyze a commit batch. Implementations must not keep state between
    /// calls; the same input always yields the same promotions.
    fn analyze(&self, commits: &[Commit]) -> Result<Vec<Promotion>, DomainError>;
}
