//! Crawl frontier
//!
//! A FIFO queue of URLs to visit plus the two sets that gate it: the URLs
//! currently queued and the URLs already popped. A URL enters the queue at
//! most once per run.

use std::collections::{HashSet, VecDeque};

/// How a frontier entry was discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryOrigin {
    /// Initial seed URL
    Seed,
    /// Link extracted from a crawled page
    Link,
    /// External search result
    Reseed,
}

/// A URL waiting to be crawled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    pub depth: u32,
    pub origin: EntryOrigin,
}

/// Breadth-first work queue with visited and in-queue dedup
///
/// The in-queue set always equals the set of URLs in the queue.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    in_queue: HashSet<String>,
    visited: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a URL at the tail unless it was already visited or queued
    ///
    /// Returns true if the URL was enqueued.
    pub fn push(&mut self, url: impl Into<String>, depth: u32, origin: EntryOrigin) -> bool {
        let url = url.into();
        if self.visited.contains(&url) || self.in_queue.contains(&url) {
            return false;
        }

        self.in_queue.insert(url.clone());
        self.queue.push_back(FrontierEntry { url, depth, origin });
        true
    }

    /// Removes and returns the head entry
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        let entry = self.queue.pop_front()?;
        self.in_queue.remove(&entry.url);
        Some(entry)
    }

    /// Records a URL as visited; returns false if it already was
    pub fn mark_visited(&mut self, url: &str) -> bool {
        self.visited.insert(url.to_string())
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    pub fn is_queued(&self, url: &str) -> bool {
        self.in_queue.contains(url)
    }

    /// Number of queued entries
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
