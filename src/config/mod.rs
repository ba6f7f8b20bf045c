//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, plus reading the newline-delimited seed list.
//!
//! # Example
//!
//! ```no_run
//! use aisans_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config/crawler.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod seeds;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, ReseedConfig, ReseedFallback, SearchConfig,
    SummarizerConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use seeds::load_seeds;
