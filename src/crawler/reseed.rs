//! Search-driven frontier re-seeding
//!
//! Every `interval-pages` processed pages the crawl asks an external search
//! capability about what it just read and folds novel result URLs back into
//! the frontier at depth 0.

use crate::config::{ReseedConfig, ReseedFallback};
use crate::crawler::{EntryOrigin, Frontier};
use crate::search::{SearchError, SearchProvider};
use crate::url::canonicalize_url;

/// Result of one re-seed cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReseedOutcome {
    /// The query that was issued
    pub query: String,

    /// Number of results the search returned
    pub candidates: usize,

    /// Number of genuinely new URLs pushed into the frontier
    pub added: usize,
}

/// Decides when to re-seed, what to search for, and folds results back in
#[derive(Debug, Clone)]
pub struct ReseedPolicy {
    enabled: bool,
    interval_pages: u32,
    results_per_engine: usize,
    prefer_summary: bool,
    fallback: ReseedFallback,
    engines: Vec<String>,
    first_seed: Option<String>,
}

impl ReseedPolicy {
    pub fn new(config: &ReseedConfig, first_seed: Option<String>) -> Self {
        Self {
            enabled: config.enabled,
            interval_pages: config.interval_pages.max(1),
            results_per_engine: config.results_per_engine,
            prefer_summary: config.prefer_summary,
            fallback: config.fallback,
            engines: config.engines.clone(),
            first_seed,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a cycle runs after the iteration that brought the processed
    /// page count to `pages_processed`
    pub fn is_due(&self, pages_processed: u64) -> bool {
        self.enabled && pages_processed > 0 && pages_processed % u64::from(self.interval_pages) == 0
    }

    /// Picks the query for a cycle
    ///
    /// Preference order: the just-processed page's summary (when
    /// `prefer-summary` is on), then its title, then the configured fallback.
    /// Blank candidates are ignored. Returns None when the cycle should be
    /// skipped.
    pub fn select_query(&self, summary: Option<&str>, title: Option<&str>) -> Option<String> {
        let summary = summary.filter(|_| self.prefer_summary);

        summary
            .into_iter()
            .chain(title)
            .map(str::trim)
            .find(|candidate| !candidate.is_empty())
            .map(str::to_string)
            .or_else(|| match self.fallback {
                ReseedFallback::FirstSeed => self.first_seed.clone(),
                ReseedFallback::Skip => None,
            })
    }

    /// Runs one search and pushes new result URLs at depth 0
    ///
    /// Results already visited or queued are dropped by the frontier and are
    /// not counted in `added`. Results whose URL is not a crawlable HTTP(S)
    /// URL are skipped.
    pub async fn run(
        &self,
        provider: &dyn SearchProvider,
        frontier: &mut Frontier,
        query: &str,
    ) -> Result<ReseedOutcome, SearchError> {
        let results = provider
            .search(query, &self.engines, self.results_per_engine)
            .await?;

        let mut added = 0;
        for result in &results {
            let url = match canonicalize_url(&result.url) {
                Ok(url) => url,
                Err(e) => {
                    tracing::debug!("Skipping search result '{}': {}", result.url, e);
                    continue;
                }
            };

            if frontier.push(url.as_str(), 0, EntryOrigin::Reseed) {
                tracing::debug!(url = %url, engine = %result.source_engine, "Re-seeded URL");
                added += 1;
            }
        }

        Ok(ReseedOutcome {
            query: query.to_string(),
            candidates: results.len(),
            added,
        })
    }
}
