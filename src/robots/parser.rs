//! Robots.txt parser implementation
//!
//! This module provides functionality for matching URLs against robots.txt
//! content using the robotstxt crate.

use robotstxt::DefaultMatcher;

/// A site's robots.txt rules, or a blanket allow when none apply
///
/// Matching is delegated to `robotstxt::DefaultMatcher`, which follows the
/// Google robots.txt semantics (longest match wins, `Allow` beats `Disallow`
/// on ties).
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// None when robots.txt was absent, unreadable or empty
    rules: Option<String>,
}

impl ParsedRobots {
    pub fn from_content(content: &str) -> Self {
        let rules = Some(content.to_string()).filter(|rules| !rules.trim().is_empty());
        Self { rules }
    }

    /// Used for origins whose robots.txt is missing or failed to load
    pub fn allow_all() -> Self {
        Self { rules: None }
    }

    pub fn allows_everything(&self) -> bool {
        self.rules.is_none()
    }

    /// Checks `url` against the group matching `user_agent`
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL to check
    /// * `user_agent` - The crawler's product token (e.g. "AISANS-Crawler")
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        match &self.rules {
            None => true,
            Some(rules) => {
                DefaultMatcher::default().one_agent_allowed_by_robots(rules, user_agent, url)
            }
        }
    }
}
