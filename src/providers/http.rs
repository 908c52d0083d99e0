use crate::core::config::HttpConfig;
use crate::core::error::SeriesError;
use anyhow::{Context, Result};
use reqwest::Url;
use std::time::Duration;
use tracing::debug;

/// Shared GET client carrying the configured user-agent and timeout.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    /// Returns the response body; any transport error or non-2xx status is a fetch error.
    pub async fn get_text(&self, url: &str, params: &[(&str, String)]) -> Result<String, SeriesError> {
        let parsed = if params.is_empty() {
            Url::parse(url)
        } else {
            Url::parse_with_params(url, params)
        };
        let url = parsed.map_err(|e| SeriesError::fetch(url, e))?;
        debug!("Requesting {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| SeriesError::fetch(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SeriesError::fetch(
                url.as_str(),
                format!("unexpected status {status}"),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| SeriesError::fetch(url.as_str(), e))
    }
}
