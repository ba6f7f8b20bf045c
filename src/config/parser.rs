use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::Path;

/// Loads a configuration file, falling back to built-in defaults
///
/// # Fallback Rules
///
/// | Condition | Result |
/// |-----------|--------|
/// | File does not exist | Defaults |
/// | Malformed TOML | Defaults + warning |
/// | Fails validation | Defaults + warning |
/// | Any other read failure | `Err(ConfigError::Io)` |
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use aisans_crawler::config::load_config;
///
/// let config = load_config(Path::new("config/crawler.toml")).unwrap();
/// println!("Max depth: {}", config.crawler.max_depth);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(
                "Configuration file {} not found. Using default settings.",
                path.display()
            );
            return Ok(Config::default());
        }
        Err(e) => return Err(ConfigError::Io(e)),
    };

    match parse_config(&content) {
        Ok(config) => {
            tracing::info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        Err(e) => {
            tracing::warn!(
                "Error loading {}: {}. Using default settings.",
                path.display(),
                e
            );
            Ok(Config::default())
        }
    }
}

/// Parses and validates configuration text without any fallback
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// This is recorded with every crawl run so runs can be traced back to the
/// configuration that drove them.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(hash_content(&content))
}

fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Loads a configuration and returns both the config and its hash
///
/// The hash of an absent file is the hash of the empty string, which is what
/// the defaults correspond to.
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = match compute_config_hash(path) {
        Ok(hash) => hash,
        Err(ConfigError::Io(e)) if e.kind() == ErrorKind::NotFound => hash_content(""),
        Err(e) => return Err(e),
    };
    Ok((config, hash))
}
