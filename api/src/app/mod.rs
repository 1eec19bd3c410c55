//! Application layer
//!
//! Contains the analyzers, the pipeline coordinating them, and the import
//! service that rebuilds commit history from a remote host.

pub mod cancel;
pub mod import_service;
pub mod language_analyzer;
pub mod pipeline;
pub mod rules_analyzer;

pub use cancel::CancelSignal;
pub use import_service::{FailedCommit, FailurePolicy, ImportReport, ImportService, ImportSettings};
pub use language_analyzer::LanguageAnalyzer;
pub use pipeline::PromotionPipeline;
pub use rules_analyzer::RulesAnalyzer;
