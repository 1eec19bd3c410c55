//! Collector port trait
//!
//! The collector receives emitted promotions. How submission happens is the
//! adapter's business.

use async_trait::async_trait;

use crate::domain::entities::Promotion;
use crate::error::CollectorError;

/// Port trait for submitting promotions
#[async_trait]
pub trait Collector: Send + Sync {
    /// Submit a batch of promotions, returning the collector's response body
    async fn submit(&self, promotions: &[Promotion]) -> Result<String, CollectorError>;
}
