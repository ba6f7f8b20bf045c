use crate::url::canonicalize_url;
use crate::ConfigError;
use std::io::ErrorKind;
use std::path::Path;

/// Loads seed URLs from a newline-delimited file
///
/// Lines are trimmed and blank lines ignored. Lines that are not absolute
/// HTTP(S) URLs are skipped with a warning. `extra` seeds (from the config
/// file) are appended after the file's entries, in order.
///
/// # Errors
///
/// * `ConfigError::SeedFileMissing` - the file does not exist
/// * `ConfigError::Io` - the file could not be read
/// * `ConfigError::NoSeeds` - no usable seed remained
pub fn load_seeds(path: &Path, extra: &[String]) -> Result<Vec<String>, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ConfigError::SeedFileMissing(path.display().to_string()));
        }
        Err(e) => return Err(ConfigError::Io(e)),
    };

    let seeds = parse_seed_lines(content.lines().chain(extra.iter().map(String::as_str)));

    if seeds.is_empty() {
        return Err(ConfigError::NoSeeds(path.display().to_string()));
    }

    tracing::info!("Loaded {} seed URLs from {}", seeds.len(), path.display());
    Ok(seeds)
}

fn parse_seed_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seeds = Vec::new();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match canonicalize_url(line) {
            Ok(url) => seeds.push(url.to_string()),
            Err(e) => tracing::warn!("Skipping invalid seed URL '{}': {}", line, e),
        }
    }

    seeds
}
