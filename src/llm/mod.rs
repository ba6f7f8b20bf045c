//! LLM summarization module
//!
//! Summaries are best effort: the crawl treats every failure here as "no
//! summary" and indexes the page anyway.

mod openrouter;

pub use openrouter::OpenRouterSummarizer;

use crate::config::SummarizerConfig;
use async_trait::async_trait;
use thiserror::Error;

/// Environment variable overriding the configured model
pub const MODEL_OVERRIDE_ENV: &str = "OPENROUTER_DEFAULT_MODEL";

/// Errors that can occur while calling the LLM provider
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid API key header value")]
    InvalidApiKey,
}

/// Produces short natural-language summaries of page text
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarizes `text`; `Ok(None)` means the provider produced nothing
    async fn summarize(&self, text: &str) -> Result<Option<String>, LlmError>;
}

/// Builds the configured summarizer, or None when summarization is off
///
/// Summarization is off when disabled in config, or when the API key
/// variable is unset and `require-api-key` is true. The reason is logged.
pub fn summarizer_from_config(
    config: &SummarizerConfig,
) -> Result<Option<OpenRouterSummarizer>, LlmError> {
    if !config.enabled {
        tracing::info!("LLM summarization disabled in configuration");
        return Ok(None);
    }

    let api_key = std::env::var(&config.api_key_env)
        .ok()
        .filter(|key| !key.trim().is_empty());

    if api_key.is_none() && config.require_api_key {
        tracing::warn!(
            "{} is not set; LLM summarization disabled for this run",
            config.api_key_env
        );
        return Ok(None);
    }

    let model = std::env::var(MODEL_OVERRIDE_ENV)
        .ok()
        .filter(|model| !model.trim().is_empty())
        .unwrap_or_else(|| config.model.clone());

    tracing::info!("LLM summarization enabled with model {}", model);
    OpenRouterSummarizer::new(config, api_key, model).map(Some)
}
