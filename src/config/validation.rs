use crate::config::types::{Config, CrawlerConfig, OutputConfig, ReseedConfig, SummarizerConfig};
use crate::search::KNOWN_ENGINES;
use crate::url::canonicalize_url;
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_reseed_config(&config.reseed)?;
    validate_summarizer_config(&config.summarizer)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl budgets and inline seeds
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.snippet_length < 1 {
        return Err(ConfigError::Validation(
            "snippet_length must be >= 1".to_string(),
        ));
    }

    for seed in &config.seed_urls {
        canonicalize_url(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;
    }

    Ok(())
}

/// Validates re-seed cadence and engine names
fn validate_reseed_config(config: &ReseedConfig) -> Result<(), ConfigError> {
    if config.interval_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "reseed interval_pages must be >= 1, got {}",
            config.interval_pages
        )));
    }

    if config.results_per_engine < 1 {
        return Err(ConfigError::Validation(format!(
            "reseed results_per_engine must be >= 1, got {}",
            config.results_per_engine
        )));
    }

    for engine in &config.engines {
        if !KNOWN_ENGINES.contains(&engine.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Unknown search engine '{}' (expected one of {:?})",
                engine, KNOWN_ENGINES
            )));
        }
    }

    Ok(())
}

fn validate_summarizer_config(config: &SummarizerConfig) -> Result<(), ConfigError> {
    if config.prompt_chars < 1 {
        return Err(ConfigError::Validation(
            "summarizer prompt_chars must be >= 1".to_string(),
        ));
    }

    if config.enabled && config.base_url.is_empty() {
        return Err(ConfigError::Validation(
            "summarizer base_url cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
