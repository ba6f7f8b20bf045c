//! Output module for command-line reports
//!
//! This module handles:
//! - Printing ranked search hits from the document store
//! - Printing external metasearch results
//! - Recording index statistics

pub mod stats;

pub use stats::{load_statistics, print_statistics, IndexStatistics};

use crate::search::SearchResult;
use crate::storage::{make_snippet, Document, SearchHit};
use chrono::{SecondsFormat, Utc};

/// Characters of snippet shown per printed result
const DISPLAY_SNIPPET_CHARS: usize = 160;

/// Prints ranked store search hits to stdout
pub fn print_search_hits(query: &str, hits: &[SearchHit]) {
    println!("=== Search: {} ===\n", query);

    if hits.is_empty() {
        println!("No matching documents.");
        return;
    }

    for (i, hit) in hits.iter().enumerate() {
        let doc = &hit.document;
        println!("{}. {}", i + 1, doc.title);
        println!("   {}", doc.url);
        println!("   [{}] rank {:.3}", doc.source_engine, hit.rank);
        let text = doc.summary.as_deref().unwrap_or(&doc.snippet);
        println!("   {}", make_snippet(text, DISPLAY_SNIPPET_CHARS));
        println!();
    }
}

/// Prints external metasearch results to stdout
pub fn print_search_results(query: &str, results: &[SearchResult]) {
    println!("=== Metasearch: {} ===\n", query);

    if results.is_empty() {
        println!("No results.");
        return;
    }

    for (i, result) in results.iter().enumerate() {
        let title = if result.title.trim().is_empty() {
            &result.url
        } else {
            &result.title
        };
        println!("{}. {} [{}]", i + 1, title, result.source_engine);
        println!("   {}", result.url);
        if !result.snippet.trim().is_empty() {
            println!("   {}", make_snippet(&result.snippet, DISPLAY_SNIPPET_CHARS));
        }
        println!();
    }
}

/// Converts metasearch results into documents for indexing
///
/// The snippet doubles as the body; a blank title falls back to the URL.
/// Results without a snippet yield documents the store will reject.
pub fn documents_from_results(results: &[SearchResult]) -> Vec<Document> {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    results
        .iter()
        .map(|result| {
            let title = match result.title.trim() {
                "" => result.url.clone(),
                title => title.to_string(),
            };
            Document {
                url: result.url.clone(),
                title,
                body: result.snippet.clone(),
                snippet: result.snippet.clone(),
                summary: None,
                source_engine: result.source_engine.clone(),
                crawled_timestamp: timestamp.clone(),
            }
        })
        .collect()
}
