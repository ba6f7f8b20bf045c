/// Crawl controller state definitions
///
/// This module defines the lifecycle states of a crawl run and the legal
/// transitions between them.
use std::fmt;

/// Represents the current state of the crawl controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    /// Configured but not started
    Idle,

    /// Popping and processing frontier entries
    Running,

    /// Page budget reached; finishing the current iteration
    Draining,

    /// Frontier ran empty
    Exhausted,

    /// Run finished
    Stopped,
}

impl CrawlState {
    /// Returns true if the controller may move from `self` to `next`
    ///
    /// Legal transitions:
    /// - `Idle -> Running`
    /// - `Running -> Draining | Exhausted`
    /// - `Draining | Exhausted -> Stopped`
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::Draining)
                | (Self::Running, Self::Exhausted)
                | (Self::Draining, Self::Stopped)
                | (Self::Exhausted, Self::Stopped)
        )
    }

    /// Returns true while the loop should keep popping entries
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Exhausted => "exhausted",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
