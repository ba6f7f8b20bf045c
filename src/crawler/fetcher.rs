//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - robots.txt checks through an owned per-origin cache
//! - GET requests to fetch page content
//! - Error classification

use crate::config::UserAgentConfig;
use crate::crawler::{FetchError, PageFetcher};
use crate::robots::{fetch_robots, ParsedRobots, RobotsCache};
use crate::url::robots_origin;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Example
///
/// ```no_run
/// use aisans_crawler::config::UserAgentConfig;
/// use aisans_crawler::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages over HTTP, honoring robots.txt
///
/// # Error Classification
///
/// | Condition | Error |
/// |-----------|-------|
/// | Disallowed by robots.txt | `FetchError::Disallowed` |
/// | Request timeout | `FetchError::Timeout` |
/// | Connection/DNS/TLS failure | `FetchError::Network` |
/// | Non-2xx status | `FetchError::Status` |
/// | Unreadable body | `FetchError::Body` |
///
/// No retries: a failed URL is abandoned by the caller.
pub struct HttpFetcher {
    client: Client,
    robots_agent: String,
    robots: Mutex<RobotsCache>,
}

impl HttpFetcher {
    pub fn new(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(
            build_http_client(config)?,
            &config.crawler_name,
        ))
    }

    /// Creates a fetcher around an existing client
    ///
    /// `robots_agent` is the product token matched against robots.txt groups.
    pub fn with_client(client: Client, robots_agent: &str) -> Self {
        Self {
            client,
            robots_agent: robots_agent.to_string(),
            robots: Mutex::new(RobotsCache::new()),
        }
    }

    /// Gets robots.txt for the URL's origin, fetching if absent or stale
    async fn robots_for(&self, url: &Url) -> ParsedRobots {
        let Some(origin) = robots_origin(url) else {
            return ParsedRobots::allow_all();
        };

        if let Some(cached) = self.robots.lock().await.get(&origin) {
            tracing::trace!("Using cached robots.txt for {}", origin);
            return cached.content.clone();
        }

        tracing::debug!("Fetching robots.txt for {}", origin);
        let robots = fetch_robots(&self.client, &origin).await;
        self.robots.lock().await.insert(origin, robots.clone());
        robots
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let robots = self.robots_for(url).await;
        if !robots.is_allowed(url.as_str(), &self.robots_agent) {
            return Err(FetchError::Disallowed);
        }

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Body(e.to_string())
            }
        })
    }
}
