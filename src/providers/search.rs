use async_trait::async_trait;
use log::error;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::app_config::SearchConfig;
use crate::errors::ProviderError;
use crate::providers::{SearchProvider, SearchResults};

/// Client for the web search API
#[derive(Debug)]
pub struct WebSearch {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl WebSearch {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder().timeout(timeout).build().unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(
            config.api_key.trim(),
            &config.endpoint,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Build the GET url with query parameters
    pub fn build_url(&self, query: &str, max_results: usize) -> Result<Url, ProviderError> {
        Url::parse_with_params(&self.endpoint, &[("q", query.to_string()), ("count", max_results.to_string())])
            .map_err(|e| ProviderError::RequestFailed(format!("invalid search endpoint {}: {}", self.endpoint, e)))
    }
}

#[async_trait]
impl SearchProvider for WebSearch {
    fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<SearchResults, ProviderError> {
        let url = self.build_url(query, max_results)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport("search", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Search API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        response
            .json::<SearchResults>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("search response: {}", e)))
    }
}
