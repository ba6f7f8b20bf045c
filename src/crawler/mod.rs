//! Crawler module for the breadth-first crawl loop
//!
//! This module contains the core crawling logic, including:
//! - The frontier of URLs to visit with its visited set
//! - Collaborator interfaces for fetching and parsing pages
//! - HTTP fetching with robots.txt compliance
//! - HTML text and link extraction
//! - Search-driven frontier re-seeding
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod reseed;

pub use coordinator::{run_crawl, Coordinator, CrawlReport, StopReason};
pub use fetcher::{build_http_client, HttpFetcher};
pub use frontier::{EntryOrigin, Frontier, FrontierEntry};
pub use parser::HtmlParser;
pub use reseed::{ReseedOutcome, ReseedPolicy};

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// Why a page could not be fetched
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Disallowed by robots.txt")]
    Disallowed,

    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// Why fetched content could not be parsed
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Unsupported content: {0}")]
    Unsupported(String),
}

/// Text and links extracted from a fetched page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// The page title, if the page has a non-empty one
    pub title: Option<String>,

    /// Whitespace-normalized visible text
    pub text: String,

    /// Absolute URLs of outgoing links, in first-seen order
    pub links: Vec<String>,
}

/// Retrieves page content for a URL
///
/// Implementations honor any site-access policy and report timeouts,
/// non-success statuses and disallowed URLs as errors.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// Extracts title, text and links from fetched content
///
/// Implementations must tolerate malformed markup.
pub trait PageParser: Send + Sync {
    fn parse(&self, content: &str, base_url: &Url) -> Result<ParsedPage, ParseError>;
}
