//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Seeding the frontier
//! - Driving the crawl state machine
//! - Coordinating fetching, parsing, summarization and indexing
//! - Expanding the frontier from extracted links and re-seed searches
//! - Recording the run in the document store

use crate::config::{Config, ReseedConfig};
use crate::crawler::{
    EntryOrigin, FetchError, Frontier, FrontierEntry, HtmlParser, HttpFetcher, PageFetcher,
    PageParser, ParsedPage, ReseedPolicy,
};
use crate::llm::{summarizer_from_config, Summarizer};
use crate::search::{MetaSearch, SearchProvider};
use crate::state::CrawlState;
use crate::storage::{make_snippet, Document, DocumentStore, RunStatus, SqliteDocumentStore};
use crate::url::{canonicalize_url, resolve_link};
use crate::{ConfigError, CrawlError};
use chrono::{SecondsFormat, Utc};
use std::path::Path;
use std::time::Instant;
use url::Url;

/// Source engine recorded on documents the crawler indexes
pub const CRAWLER_SOURCE: &str = "crawler";

/// Pages between progress log lines
const PROGRESS_INTERVAL: u64 = 10;

/// Why the crawl loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    FrontierExhausted,
    PageBudgetReached,
}

/// Counters describing a finished crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub pages_processed: u64,
    pub documents_indexed: u64,
    pub fetch_failures: u64,
    pub parse_failures: u64,
    pub index_failures: u64,
    pub summaries_produced: u64,
    pub reseed_cycles: u64,
    pub reseed_urls_added: u64,
    pub visited: usize,
    pub frontier_remaining: usize,
    pub stop: StopReason,
}

/// Context of the page processed in the current iteration, used to pick the
/// re-seed query
#[derive(Debug, Default)]
struct PageContext {
    title: Option<String>,
    summary: Option<String>,
}

/// Main crawler coordinator structure
///
/// Owns the frontier, the document store and the collaborators. Processing
/// is strictly sequential: each URL is fetched, parsed, summarized and
/// indexed before the next one is popped.
pub struct Coordinator {
    max_depth: u32,
    max_pages: u64,
    snippet_length: usize,
    summary_input_chars: usize,
    config_hash: String,
    seeds: Vec<String>,
    store: Box<dyn DocumentStore>,
    fetcher: Box<dyn PageFetcher>,
    parser: Box<dyn PageParser>,
    summarizer: Option<Box<dyn Summarizer>>,
    search: Option<Box<dyn SearchProvider>>,
    reseed: ReseedPolicy,
    frontier: Frontier,
    state: CrawlState,
    report: Counters,
}

#[derive(Debug, Default)]
struct Counters {
    pages_processed: u64,
    documents_indexed: u64,
    fetch_failures: u64,
    parse_failures: u64,
    index_failures: u64,
    summaries_produced: u64,
    reseed_cycles: u64,
    reseed_urls_added: u64,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Seeds are canonicalized and pushed at depth 0; invalid seeds are
    /// skipped with a warning.
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `seeds` - Seed URLs, in crawl order
    /// * `store` - The document store to index into
    /// * `fetcher` - Page fetching collaborator
    /// * `parser` - Page parsing collaborator
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run, in the `Idle` state
    /// * `Err(CrawlError)` - No usable seed
    pub fn new(
        config: &Config,
        seeds: &[String],
        store: Box<dyn DocumentStore>,
        fetcher: Box<dyn PageFetcher>,
        parser: Box<dyn PageParser>,
    ) -> Result<Self, CrawlError> {
        let mut frontier = Frontier::new();
        let mut accepted = Vec::new();

        for seed in seeds {
            match canonicalize_url(seed) {
                Ok(url) => {
                    if frontier.push(url.as_str(), 0, EntryOrigin::Seed) {
                        accepted.push(url.to_string());
                    }
                }
                Err(e) => tracing::warn!("Skipping invalid seed URL '{}': {}", seed, e),
            }
        }

        if accepted.is_empty() {
            return Err(ConfigError::NoSeeds("seed list".to_string()).into());
        }

        Ok(Self {
            max_depth: config.crawler.max_depth,
            max_pages: u64::from(config.crawler.max_pages),
            snippet_length: config.crawler.snippet_length,
            summary_input_chars: config.summarizer.prompt_chars,
            config_hash: String::new(),
            reseed: ReseedPolicy::new(&config.reseed, accepted.first().cloned()),
            seeds: accepted,
            store,
            fetcher,
            parser,
            summarizer: None,
            search: None,
            frontier,
            state: CrawlState::Idle,
            report: Counters::default(),
        })
    }

    /// Attaches an LLM summarizer
    pub fn with_summarizer(mut self, summarizer: Box<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Attaches the external search capability used for re-seeding
    pub fn with_search(mut self, search: Box<dyn SearchProvider>) -> Self {
        self.search = Some(search);
        self
    }

    /// Replaces the re-seed policy settings
    pub fn with_reseed_config(mut self, config: &ReseedConfig) -> Self {
        self.reseed = ReseedPolicy::new(config, self.seeds.first().cloned());
        self
    }

    /// Sets the configuration hash recorded with the run
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = hash.into();
        self
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    fn transition(&mut self, next: CrawlState) -> Result<(), CrawlError> {
        if !self.state.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!("Crawl state {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Runs the main crawl loop to completion
    ///
    /// # Loop Protocol
    ///
    /// 1. Pop an entry; an empty frontier ends the run (`Exhausted`)
    /// 2. Skip URLs already visited
    /// 3. Mark visited and count the page
    /// 4. Fetch; on failure log and move on
    /// 5. Parse; on failure log and move on
    /// 6. Summarize (best effort)
    /// 7. Upsert the document; failures are logged
    /// 8. Below `max-depth`, push extracted links at depth + 1
    /// 9. Every `interval-pages` pages, run a re-seed cycle
    /// 10. Stop before the next pop once `max-pages` pages were processed
    ///     (`Draining`)
    ///
    /// Per-URL and re-seed failures never end the run. Only store errors
    /// while recording the run itself are returned.
    pub async fn run(&mut self) -> Result<CrawlReport, CrawlError> {
        self.transition(CrawlState::Running)?;
        let run_id = self.store.create_run(&self.config_hash)?;
        let start_time = Instant::now();

        tracing::info!(
            "Starting crawl run {}. Max depth: {}, max pages: {}, {} seed(s) queued",
            run_id,
            self.max_depth,
            self.max_pages,
            self.frontier.len()
        );
        if !self.reseed.is_enabled() {
            tracing::info!("Re-seeding disabled");
        } else if self.search.is_none() {
            tracing::warn!("Re-seeding enabled but no search capability configured");
        }

        let stop = self.crawl_loop(start_time).await;

        let status = if stop.is_ok() {
            RunStatus::Completed
        } else {
            RunStatus::Failed
        };
        self.store.finish_run(
            run_id,
            status,
            self.report.pages_processed,
            self.report.documents_indexed,
        )?;
        let stop = stop?;

        self.transition(CrawlState::Stopped)?;

        let report = self.build_report(stop);
        tracing::info!(
            "Crawl finished ({:?}): {} pages processed, {} documents indexed, {} URLs remaining in queue, took {:?}",
            report.stop,
            report.pages_processed,
            report.documents_indexed,
            report.frontier_remaining,
            start_time.elapsed()
        );

        Ok(report)
    }

    async fn crawl_loop(&mut self, start_time: Instant) -> Result<StopReason, CrawlError> {
        while self.state.is_active() {
            // Checked before popping so a zero budget never fetches
            if self.report.pages_processed >= self.max_pages {
                tracing::info!("Page budget of {} reached", self.max_pages);
                self.transition(CrawlState::Draining)?;
                return Ok(StopReason::PageBudgetReached);
            }

            let Some(entry) = self.frontier.pop() else {
                tracing::info!("Frontier is empty, crawl complete");
                self.transition(CrawlState::Exhausted)?;
                return Ok(StopReason::FrontierExhausted);
            };

            if !self.frontier.mark_visited(&entry.url) {
                tracing::debug!("Skipping already visited URL: {}", entry.url);
                continue;
            }
            self.report.pages_processed += 1;

            tracing::info!(
                url = %entry.url,
                depth = entry.depth,
                "Processing URL ({}/{})",
                self.report.pages_processed,
                self.max_pages
            );

            let context = self.process_entry(&entry).await;

            if self.reseed.is_due(self.report.pages_processed) {
                self.run_reseed(&context).await;
            }

            if self.report.pages_processed % PROGRESS_INTERVAL == 0 {
                let rate =
                    self.report.pages_processed as f64 / start_time.elapsed().as_secs_f64().max(1e-9);
                tracing::info!(
                    "Progress: {} pages processed, {} indexed, {} in frontier, {:.2} pages/sec",
                    self.report.pages_processed,
                    self.report.documents_indexed,
                    self.frontier.len(),
                    rate
                );
            }
        }

        // Only reachable if the loop was entered outside `Running`
        Err(CrawlError::InvalidTransition {
            from: self.state,
            to: CrawlState::Stopped,
        })
    }

    /// Fetches, parses, summarizes and indexes one entry, then expands the
    /// frontier from its links
    ///
    /// Returns the page context for re-seeding; empty when the page could
    /// not be fetched or parsed.
    async fn process_entry(&mut self, entry: &FrontierEntry) -> PageContext {
        let url = match Url::parse(&entry.url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(url = %entry.url, error = %e, "Unparseable frontier URL");
                self.report.fetch_failures += 1;
                return PageContext::default();
            }
        };

        let content = match self.fetcher.fetch(&url).await {
            Ok(content) => content,
            Err(e) => {
                self.report.fetch_failures += 1;
                match e {
                    FetchError::Disallowed => {
                        tracing::info!(url = %url, "URL disallowed by robots.txt")
                    }
                    e => tracing::warn!(url = %url, error = %e, "Fetch failed"),
                }
                return PageContext::default();
            }
        };

        let page = match self.parser.parse(&content, &url) {
            Ok(page) => page,
            Err(e) => {
                self.report.parse_failures += 1;
                tracing::warn!(url = %url, error = %e, "Failed to parse content");
                return PageContext::default();
            }
        };

        let summary = self.summarize(&url, &page.text).await;
        self.index(&url, &page, summary.clone());

        if entry.depth < self.max_depth {
            self.enqueue_links(&url, &page.links, entry.depth + 1);
        } else {
            tracing::debug!(
                url = %url,
                "Reached max depth ({}), not following links",
                self.max_depth
            );
        }

        PageContext {
            title: page.title,
            summary,
        }
    }

    async fn summarize(&mut self, url: &Url, text: &str) -> Option<String> {
        let summarizer = self.summarizer.as_ref()?;
        if text.trim().is_empty() {
            return None;
        }

        let prefix = match text.char_indices().nth(self.summary_input_chars) {
            Some((cut, _)) => &text[..cut],
            None => text,
        };

        match summarizer.summarize(prefix).await {
            Ok(Some(summary)) => {
                self.report.summaries_produced += 1;
                tracing::debug!(url = %url, "Summary produced");
                Some(summary)
            }
            Ok(None) => {
                tracing::warn!(url = %url, "LLM generated no summary");
                None
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "LLM summarization failed");
                None
            }
        }
    }

    fn index(&mut self, url: &Url, page: &ParsedPage, summary: Option<String>) {
        let document = Document {
            url: url.to_string(),
            title: page.title.clone().unwrap_or_else(|| url.to_string()),
            body: page.text.clone(),
            snippet: make_snippet(&page.text, self.snippet_length),
            summary,
            source_engine: CRAWLER_SOURCE.to_string(),
            crawled_timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        };

        match self.store.upsert(&document) {
            Ok(()) => {
                self.report.documents_indexed += 1;
                tracing::debug!(url = %url, "Document added to index");
            }
            Err(e) => {
                self.report.index_failures += 1;
                tracing::warn!(url = %url, error = %e, "Failed to add document to index");
            }
        }
    }

    fn enqueue_links(&mut self, base_url: &Url, links: &[String], depth: u32) {
        let mut added = 0;
        for link in links {
            let Some(resolved) = resolve_link(link, base_url) else {
                tracing::trace!("Ignoring link {}", link);
                continue;
            };
            if self.frontier.push(resolved.as_str(), depth, EntryOrigin::Link) {
                tracing::trace!("Enqueued {} (depth {})", resolved, depth);
                added += 1;
            }
        }
        tracing::debug!(
            url = %base_url,
            "Enqueued {} of {} links at depth {}",
            added,
            links.len(),
            depth
        );
    }

    async fn run_reseed(&mut self, context: &PageContext) {
        let Some(search) = self.search.as_deref() else {
            tracing::debug!("Re-seed due but no search capability configured");
            return;
        };

        let Some(query) = self
            .reseed
            .select_query(context.summary.as_deref(), context.title.as_deref())
        else {
            tracing::info!("Skipping re-seed: no suitable query");
            return;
        };

        tracing::info!(
            "Triggering re-seed after {} pages with query '{}'",
            self.report.pages_processed,
            truncate_for_log(&query, 100)
        );

        match self.reseed.run(search, &mut self.frontier, &query).await {
            Ok(outcome) => {
                self.report.reseed_cycles += 1;
                self.report.reseed_urls_added += outcome.added as u64;
                tracing::info!(
                    "Re-seed found {} results, added {} new URLs",
                    outcome.candidates,
                    outcome.added
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "Re-seed search failed; skipping this cycle");
            }
        }
    }

    fn build_report(&self, stop: StopReason) -> CrawlReport {
        CrawlReport {
            pages_processed: self.report.pages_processed,
            documents_indexed: self.report.documents_indexed,
            fetch_failures: self.report.fetch_failures,
            parse_failures: self.report.parse_failures,
            index_failures: self.report.index_failures,
            summaries_produced: self.report.summaries_produced,
            reseed_cycles: self.report.reseed_cycles,
            reseed_urls_added: self.report.reseed_urls_added,
            visited: self.frontier.visited_count(),
            frontier_remaining: self.frontier.len(),
            stop,
        }
    }
}

fn truncate_for_log(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Runs the main crawl operation with the real collaborators
///
/// 1. Load seeds (seed file plus inline seeds)
/// 2. Open the document store
/// 3. Build the HTTP fetcher, HTML parser and, when available, the
///    summarizer and metasearch
/// 4. Run the crawl loop
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `config_hash` - Hash of the configuration file, recorded with the run
///
/// # Example
///
/// ```no_run
/// use aisans_crawler::config::load_config_with_hash;
/// use aisans_crawler::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("config/crawler.toml"))?;
/// let report = run_crawl(&config, &hash).await?;
/// println!("Indexed {} documents", report.documents_indexed);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config, config_hash: &str) -> Result<CrawlReport, CrawlError> {
    let seeds = crate::config::load_seeds(
        Path::new(&config.crawler.seed_file),
        &config.crawler.seed_urls,
    )?;

    let store = SqliteDocumentStore::new(Path::new(&config.output.database_path))?;
    let fetcher = HttpFetcher::new(&config.user_agent)?;

    let mut coordinator = Coordinator::new(
        config,
        &seeds,
        Box::new(store),
        Box::new(fetcher),
        Box::new(HtmlParser::new()),
    )?
    .with_config_hash(config_hash);

    match summarizer_from_config(&config.summarizer) {
        Ok(Some(summarizer)) => coordinator = coordinator.with_summarizer(Box::new(summarizer)),
        Ok(None) => {}
        Err(e) => tracing::warn!("LLM summarizer unavailable: {}", e),
    }

    if config.reseed.enabled {
        let client = crate::crawler::build_http_client(&config.user_agent)?;
        coordinator =
            coordinator.with_search(Box::new(MetaSearch::from_config(client, &config.search)));
    }

    coordinator.run().await
}
