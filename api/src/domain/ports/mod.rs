//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod analyzer;
pub mod collector;
pub mod commit_source;

pub use analyzer::Analyzer;
pub use collector::Collector;
pub use commit_source::CommitSource;
