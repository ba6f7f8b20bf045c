//! Storage module for the full-text document index
//!
//! This module handles all database operations, including:
//! - SQLite FTS5 schema management
//! - URL-keyed document upserts (single and batched)
//! - Ranked full-text search
//! - Crawl run tracking

mod schema;
mod sqlite;
mod traits;

pub use schema::to_match_query;
pub use sqlite::SqliteDocumentStore;
pub use traits::{DocumentStore, StorageError, StorageResult};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Initializes or opens a document store
pub fn open_store(path: &Path) -> StorageResult<SqliteDocumentStore> {
    SqliteDocumentStore::new(path)
}

/// A page in the full-text index, keyed by URL
///
/// Every field except `summary` is required; a required field counts as
/// missing when it is blank. Deserializing JSON with absent fields yields
/// blank values, which the store then rejects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub url: String,
    pub title: String,
    pub body: String,
    pub snippet: String,
    pub summary: Option<String>,
    pub source_engine: String,
    pub crawled_timestamp: String,
}

impl Document {
    /// Returns the name of the first blank required field, if any
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("url", &self.url),
            ("title", &self.title),
            ("body", &self.body),
            ("snippet", &self.snippet),
            ("source_engine", &self.source_engine),
            ("crawled_timestamp", &self.crawled_timestamp),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }

    /// Checks that all required fields are present
    pub fn validate(&self) -> StorageResult<()> {
        match self.missing_field() {
            Some(field) => Err(StorageError::MissingField {
                url: self.url.clone(),
                field,
            }),
            None => Ok(()),
        }
    }
}

/// Builds a snippet from a page body: the first `max_chars` characters,
/// followed by `...` when the body was cut
pub fn make_snippet(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

/// A search result with its relevance score
///
/// Lower `rank` is more relevant (FTS5 bm25 convention).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub document: Document,
    pub rank: f64,
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub pages_processed: u64,
    pub documents_indexed: u64,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_document() -> Document {
        Document {
            url: "http://a.test/".to_string(),
            title: "A".to_string(),
            body: "body".to_string(),
            snippet: "body".to_string(),
            summary: None,
            source_engine: "crawler".to_string(),
            crawled_timestamp: "2024-01-01T10:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_complete_document_is_valid() {
        assert!(complete_document().validate().is_ok());
    }

    #[test]
    fn test_summary_is_optional() {
        let doc = complete_document();
        assert_eq!(doc.missing_field(), None);
    }

    #[test]
    fn test_blank_body_is_missing() {
        let doc = Document {
            body: "   ".to_string(),
            ..complete_document()
        };
        assert_eq!(doc.missing_field(), Some("body"));
        assert!(matches!(
            doc.validate(),
            Err(StorageError::MissingField { field: "body", .. })
        ));
    }

    #[test]
    fn test_deserialize_with_absent_field() {
        let doc: Document =
            serde_json::from_str(r#"{"url": "http://a.test/", "title": "A"}"#).unwrap();
        assert_eq!(doc.missing_field(), Some("body"));
    }

    #[test]
    fn test_make_snippet_short_body() {
        assert_eq!(make_snippet("short", 200), "short");
    }

    #[test]
    fn test_make_snippet_truncates_on_char_boundary() {
        assert_eq!(make_snippet("cafébar", 4), "café...");
        assert_eq!(make_snippet("abcd", 4), "abcd");
    }

    #[test]
    fn test_run_status_roundtrip() {
        for status in &[RunStatus::Running, RunStatus::Completed, RunStatus::Failed] {
            let db_str = status.to_db_string();
            assert_eq!(Some(*status), RunStatus::from_db_string(db_str));
        }
        assert_eq!(RunStatus::from_db_string("invalid"), None);
    }
}
