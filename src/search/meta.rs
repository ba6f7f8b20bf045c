//! Metasearch aggregation across named engines

use crate::config::SearchConfig;
use crate::search::{
    DuckDuckGoEngine, GoogleEngine, SearchEngine, SearchError, SearchProvider, SearchResultList,
};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashSet;

/// Queries registered engines by name and merges their results
///
/// # Aggregation Rules
///
/// - Engines are queried in the requested order
/// - Unknown engine names are skipped with a warning
/// - Results with an empty URL are dropped
/// - Results are de-duplicated by URL; the first engine to return a URL wins
/// - A failing engine is logged and skipped; if every engine that was
///   queried fails, the search fails with `SearchError::AllEnginesFailed`
#[derive(Default)]
pub struct MetaSearch {
    engines: Vec<Box<dyn SearchEngine>>,
}

impl MetaSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the built-in engines (Google, DuckDuckGo)
    pub fn from_config(client: Client, config: &SearchConfig) -> Self {
        Self::new()
            .with_engine(GoogleEngine::from_config(client.clone(), config))
            .with_engine(DuckDuckGoEngine::new(client))
    }

    /// Registers an engine, replacing any engine with the same name
    pub fn with_engine(mut self, engine: impl SearchEngine + 'static) -> Self {
        self.engines.retain(|existing| existing.name() != engine.name());
        self.engines.push(Box::new(engine));
        self
    }

    pub fn engine_names(&self) -> Vec<&str> {
        self.engines.iter().map(|engine| engine.name()).collect()
    }

    fn engine(&self, name: &str) -> Option<&dyn SearchEngine> {
        self.engines
            .iter()
            .find(|engine| engine.name() == name)
            .map(|engine| engine.as_ref())
    }
}

#[async_trait]
impl SearchProvider for MetaSearch {
    async fn search(
        &self,
        query: &str,
        engines: &[String],
        limit_per_engine: usize,
    ) -> SearchResultList {
        let mut results = Vec::new();
        let mut seen_urls = HashSet::new();
        let mut attempted = 0;
        let mut failed = 0;

        for name in engines {
            let Some(engine) = self.engine(name) else {
                tracing::warn!("Unknown search engine '{}', skipping", name);
                continue;
            };

            attempted += 1;
            match engine.search(query, limit_per_engine).await {
                Ok(engine_results) => {
                    let returned = engine_results.len();
                    for result in engine_results {
                        let url = result.url.trim();
                        if url.is_empty() || !seen_urls.insert(url.to_string()) {
                            continue;
                        }
                        results.push(result);
                    }
                    tracing::debug!("{} returned {} results", name, returned);
                }
                Err(e) => {
                    failed += 1;
                    tracing::warn!(engine = %name, error = %e, "Search engine failed");
                }
            }
        }

        if attempted > 0 && failed == attempted {
            return Err(SearchError::AllEnginesFailed);
        }

        tracing::info!("Metasearch for '{}' found {} unique results", query, results.len());
        Ok(results)
    }
}
