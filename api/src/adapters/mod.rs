//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod collector;
pub mod github;

pub use collector::HttpCollector;
pub use github::{GithubClientImpl, GithubCredentials};
