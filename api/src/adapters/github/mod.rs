//! GitHub adapter
//!
//! Implementation of the commit source port against the GitHub REST API.

pub mod client;

pub use client::{GithubClientImpl, GithubCredentials};
