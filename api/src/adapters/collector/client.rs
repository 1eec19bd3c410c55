//! Collector API client implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::domain::entities::Promotion;
use crate::domain::ports::Collector;
use crate::error::CollectorError;

/// Posts promotions as a JSON array to the collector endpoint
pub struct HttpCollector {
    http: Client,
    url: String,
}

impl HttpCollector {
    pub fn new(url: String, timeout: Duration) -> Result<Self, CollectorError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, url })
    }
}

#[async_trait]
impl Collector for HttpCollector {
    async fn submit(&self, promotions: &[Promotion]) -> Result<String, CollectorError> {
        if promotions.is_empty() {
            return Ok(String::new());
        }

        tracing::info!(
            url = %self.url,
            count = promotions.len(),
            "Sending promotions to collector"
        );

        let response = self.http.post(&self.url).json(promotions).send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            tracing::debug!(response = %body, "Collector accepted promotions");
            Ok(body)
        } else {
            Err(CollectorError::Api {
                status: status.as_u16(),
                message: body,
            })
        }
    }
}
