//! Statistics generation from the document store
//!
//! This module provides functionality for extracting and displaying
//! index statistics from the storage layer.

use crate::storage::{DocumentStore, RunRecord, StorageResult};
use std::collections::HashMap;

/// Index statistics summary
#[derive(Debug, Clone)]
pub struct IndexStatistics {
    /// Total number of stored documents
    pub total_documents: u64,

    /// Document count per source engine
    pub documents_by_source: HashMap<String, u64>,

    /// Documents carrying an LLM summary
    pub documents_with_summary: u64,

    /// Most recent crawl run, if any
    pub latest_run: Option<RunRecord>,
}

impl IndexStatistics {
    /// Fraction of documents with a summary, as a percentage
    pub fn summary_coverage(&self) -> f64 {
        percentage(self.documents_with_summary, self.total_documents)
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The document store to query
///
/// # Returns
///
/// * `Ok(IndexStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(store: &dyn DocumentStore) -> StorageResult<IndexStatistics> {
    Ok(IndexStatistics {
        total_documents: store.count()?,
        documents_by_source: store.count_by_source()?,
        documents_with_summary: store.count_with_summary()?,
        latest_run: store.latest_run()?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &IndexStatistics) {
    println!("=== Index Statistics ===\n");

    println!("Overview:");
    println!("  Total documents: {}", stats.total_documents);
    println!(
        "  With summary: {} ({:.1}%)",
        stats.documents_with_summary,
        stats.summary_coverage()
    );
    println!();

    println!("Documents by Source:");
    // Sort sources by count (descending), then name
    let mut source_counts: Vec<_> = stats.documents_by_source.iter().collect();
    source_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    for (source, count) in source_counts {
        println!(
            "  {}: {} ({:.1}%)",
            source,
            count,
            percentage(*count, stats.total_documents)
        );
    }

    println!("\nLatest Run:");
    match &stats.latest_run {
        Some(run) => {
            println!("  ID: {}", run.id);
            println!("  Status: {}", run.status.to_db_string());
            println!("  Started: {}", run.started_at);
            println!(
                "  Finished: {}",
                run.finished_at.as_deref().unwrap_or("(not finished)")
            );
            println!("  Pages processed: {}", run.pages_processed);
            println!("  Documents indexed: {}", run.documents_indexed);
            println!("  Config hash: {}", run.config_hash);
        }
        None => println!("  (no runs recorded)"),
    }
}

fn percentage(part: u64, total: u64) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Document, RunStatus, SqliteDocumentStore};

    fn doc(url: &str, source: &str, summary: Option<&str>) -> Document {
        Document {
            url: url.to_string(),
            title: "Title".to_string(),
            body: "Body text".to_string(),
            snippet: "Body text".to_string(),
            summary: summary.map(str::to_string),
            source_engine: source.to_string(),
            crawled_timestamp: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_load_statistics_empty_store() {
        let store = SqliteDocumentStore::new_in_memory().unwrap();
        let stats = load_statistics(&store).unwrap();

        assert_eq!(stats.total_documents, 0);
        assert!(stats.documents_by_source.is_empty());
        assert!(stats.latest_run.is_none());
        assert_eq!(stats.summary_coverage(), 0.0);
    }

    #[test]
    fn test_load_statistics() {
        let mut store = SqliteDocumentStore::new_in_memory().unwrap();
        store
            .upsert_batch(&[
                doc("https://a.test/", "crawler", Some("Summary")),
                doc("https://b.test/", "crawler", None),
                doc("https://c.test/", "duckduckgo", None),
                doc("https://d.test/", "google", Some("Another")),
            ])
            .unwrap();
        let run_id = store.create_run("hash").unwrap();
        store.finish_run(run_id, RunStatus::Completed, 4, 4).unwrap();

        let stats = load_statistics(&store).unwrap();

        assert_eq!(stats.total_documents, 4);
        assert_eq!(stats.documents_by_source.get("crawler"), Some(&2));
        assert_eq!(stats.documents_by_source.get("duckduckgo"), Some(&1));
        assert_eq!(stats.documents_with_summary, 2);
        assert_eq!(stats.summary_coverage(), 50.0);
        assert_eq!(stats.latest_run.unwrap().id, run_id);
    }
}
