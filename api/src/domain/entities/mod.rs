//! Domain entities
//!
//! Pure domain models: commits, promotions, rules and the language table.

pub mod commit;
pub mod language;
pub mod promotion;
pub mod rule;

pub use commit::{ChangedFile, Commit, CommitAuthor, CommitDetail, CommitRef, FileStatus};
pub use language::{file_extension, LanguageTable};
pub use promotion::Promotion;
pub use rule::{Rule, RuleSet, RuleSpec};
