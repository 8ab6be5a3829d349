use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::ScraperConfig;
use crate::utils::error::{AppError, Result};

/// Retrieves the raw markup of a product page.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Plain HTTP GET fetcher with a bounded per-request timeout.
#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
}

impl WebScraper {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for WebScraper {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::fetch(url, describe(&e)))?;

        let response = response
            .error_for_status()
            .map_err(|e| AppError::fetch(url, describe(&e)))?;

        response
            .text()
            .await
            .map_err(|e| AppError::fetch(url, describe(&e)))
    }
}

fn describe(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("request timed out: {}", error)
    } else if let Some(status) = error.status() {
        format!("unexpected status {}", status)
    } else {
        error.to_string()
    }
}
