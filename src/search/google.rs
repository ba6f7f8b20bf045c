//! Google Custom Search JSON API client

use crate::config::SearchConfig;
use crate::search::{SearchEngine, SearchError, SearchResult, SearchResultList};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

/// The API returns at most 10 results per request
const MAX_RESULTS_PER_REQUEST: usize = 10;

/// Google Custom Search client
///
/// Without an API key and search engine id every query returns no results.
pub struct GoogleEngine {
    client: Client,
    api_key: Option<String>,
    cse_id: Option<String>,
    base_url: String,
}

/// Custom Search API response
#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
}

#[derive(Debug, Deserialize)]
struct GoogleItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

impl GoogleEngine {
    pub fn new(client: Client, api_key: Option<String>, cse_id: Option<String>) -> Self {
        Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            cse_id: cse_id.filter(|id| !id.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Reads credentials from the environment variables named in the config
    pub fn from_config(client: Client, config: &SearchConfig) -> Self {
        Self::new(
            client,
            std::env::var(&config.google_api_key_env).ok(),
            std::env::var(&config.google_cse_id_env).ok(),
        )
    }

    /// Points the engine at a different host (used by tests)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some() && self.cse_id.is_some()
    }
}

#[async_trait]
impl SearchEngine for GoogleEngine {
    fn name(&self) -> &str {
        "google"
    }

    async fn search(&self, query: &str, limit: usize) -> SearchResultList {
        let (Some(api_key), Some(cse_id)) = (&self.api_key, &self.cse_id) else {
            tracing::warn!("Google search skipped: API key or CSE id not configured");
            return Ok(Vec::new());
        };

        if limit == 0 {
            return Ok(Vec::new());
        }

        let num = limit.min(MAX_RESULTS_PER_REQUEST).to_string();
        let response = self
            .client
            .get(format!("{}/customsearch/v1", self.base_url))
            .query(&[
                ("key", api_key.as_str()),
                ("cx", cse_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                engine: self.name().to_string(),
                status: status.as_u16(),
            });
        }

        let parsed: GoogleResponse = response.json().await.map_err(|e| SearchError::Decode {
            engine: self.name().to_string(),
            message: e.to_string(),
        })?;

        let results: Vec<SearchResult> = parsed
            .items
            .into_iter()
            .filter(|item| !item.link.trim().is_empty())
            .take(limit)
            .map(|item| SearchResult {
                title: item.title,
                url: item.link,
                snippet: item.snippet,
                source_engine: "google".to_string(),
            })
            .collect();

        tracing::debug!("Google returned {} results for '{}'", results.len(), query);
        Ok(results)
    }
}
