//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.

mod cache;
mod parser;

pub use cache::{CachedRobots, RobotsCache};
pub use parser::ParsedRobots;

use crate::url::robots_url;

/// Fetches robots.txt for an origin
///
/// Never fails: a non-success status, a network error or an unreadable body
/// all yield an allow-all policy.
///
/// # Arguments
///
/// * `client` - The HTTP client to fetch with
/// * `origin` - The origin, e.g. `https://example.com`
pub async fn fetch_robots(client: &reqwest::Client, origin: &str) -> ParsedRobots {
    let Some(url) = robots_url(origin) else {
        return ParsedRobots::allow_all();
    };

    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("Failed to fetch {}: {}; allowing all", url, e);
            return ParsedRobots::allow_all();
        }
    };

    if !response.status().is_success() {
        tracing::debug!(
            "{} returned {}; allowing all",
            url,
            response.status().as_u16()
        );
        return ParsedRobots::allow_all();
    }

    match response.text().await {
        Ok(body) => ParsedRobots::from_content(&body),
        Err(e) => {
            tracing::debug!("Failed to read {}: {}; allowing all", url, e);
            ParsedRobots::allow_all()
        }
    }
}
