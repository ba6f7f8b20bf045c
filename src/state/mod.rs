//! State module for tracking crawl progress
//!
//! - `CrawlState`: lifecycle of a crawl run (idle, running, draining, exhausted, stopped)

mod crawl_state;

pub use crawl_state::CrawlState;
