//! AISANS crawler: a breadth-first crawl orchestrator backed by a full-text index
//!
//! This crate walks a bounded frontier of URLs, indexes every fetched page into
//! an SQLite FTS5 document store, and periodically re-seeds the frontier from
//! external search results keyed off recently crawled content.

pub mod config;
pub mod crawler;
pub mod llm;
pub mod output;
pub mod robots;
pub mod search;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Fatal errors that prevent a crawl from starting or completing
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid crawl state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlState,
        to: state::CrawlState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Seed file not found: {0}")]
    SeedFileMissing(String),

    #[error("No usable seed URLs in {0}")]
    NoSeeds(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlReport, Frontier, FrontierEntry};
pub use state::CrawlState;
pub use storage::{Document, DocumentStore, SqliteDocumentStore};
pub use url::{canonicalize_url, resolve_link};
