//! Collector adapter
//!
//! Submits promotions to the collector API over HTTP.

pub mod client;

pub use client::HttpCollector;
