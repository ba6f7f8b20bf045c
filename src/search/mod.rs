//! External search module
//!
//! This module provides the metasearch capability the re-seed policy and the
//! `--metasearch` command query:
//! - `SearchEngine`: one named backend (DuckDuckGo HTML, Google Custom Search)
//! - `MetaSearch`: queries engines in order and de-duplicates results by URL

mod duckduckgo;
mod google;
mod meta;

pub use duckduckgo::DuckDuckGoEngine;
pub use google::GoogleEngine;
pub use meta::MetaSearch;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Engine names accepted in configuration
pub const KNOWN_ENGINES: &[&str] = &["google", "duckduckgo"];

/// A single external search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub source_engine: String,
}

/// Errors that can occur while querying search engines
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{engine} returned HTTP {status}")]
    Status { engine: String, status: u16 },

    #[error("Failed to decode {engine} response: {message}")]
    Decode { engine: String, message: String },

    #[error("Every requested search engine failed")]
    AllEnginesFailed,
}

/// Result type for search operations
pub type SearchResultList = Result<Vec<SearchResult>, SearchError>;

/// One named search backend
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Name used in configuration and in `SearchResult::source_engine`
    fn name(&self) -> &str;

    /// Returns at most `limit` results for `query`
    async fn search(&self, query: &str, limit: usize) -> SearchResultList;
}

/// Aggregating search capability consumed by the crawl
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Queries `engines` in order, requesting `limit_per_engine` results from
    /// each, and returns results de-duplicated by URL
    async fn search(
        &self,
        query: &str,
        engines: &[String],
        limit_per_engine: usize,
    ) -> SearchResultList;
}
