//! Robots.txt caching implementation
//!
//! An explicitly owned cache of parsed robots.txt files keyed by origin
//! (`scheme://host[:port]`), with expiration after 24 hours.

use crate::robots::ParsedRobots;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Cached robots.txt data for an origin
#[derive(Debug, Clone)]
pub struct CachedRobots {
    /// The parsed robots.txt content
    pub content: ParsedRobots,

    /// When the robots.txt was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    /// Creates a new CachedRobots stamped with the current time
    pub fn new(content: ParsedRobots) -> Self {
        Self {
            content,
            fetched_at: Utc::now(),
        }
    }

    /// Checks if the cached robots.txt is older than 24 hours
    pub fn is_stale(&self) -> bool {
        Utc::now() - self.fetched_at > Duration::hours(24)
    }

    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        self.content.is_allowed(url, user_agent)
    }
}

/// Per-origin robots.txt cache
///
/// Lookups never return stale entries; the caller refetches and inserts.
#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: HashMap<String, CachedRobots>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the fresh cached entry for an origin
    pub fn get(&self, origin: &str) -> Option<&CachedRobots> {
        self.entries.get(origin).filter(|cached| !cached.is_stale())
    }

    /// Caches robots.txt for an origin, replacing any previous entry
    pub fn insert(&mut self, origin: impl Into<String>, robots: ParsedRobots) {
        self.entries.insert(origin.into(), CachedRobots::new(robots));
    }

    /// Number of cached origins (fresh or stale)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
