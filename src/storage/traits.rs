//! Storage traits and error types
//!
//! This module defines the trait interface for document store backends and
//! associated error types.

use crate::storage::{Document, RunRecord, RunStatus, SearchHit};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document {url:?} is missing required field '{field}'")]
    MissingField { url: String, field: &'static str },

    #[error("Unsupported schema version {found} (expected {expected})")]
    SchemaVersion { found: u32, expected: u32 },

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for document store implementations
///
/// The store holds at most one document per URL. Writes take `&mut self`:
/// the crawl controller is the only writer.
pub trait DocumentStore {
    // ===== Documents =====

    /// Inserts a document, atomically replacing any document with the same URL
    ///
    /// A document with a blank required field is rejected with
    /// `StorageError::MissingField` and the store is left untouched.
    fn upsert(&mut self, document: &Document) -> StorageResult<()>;

    /// Upserts many documents inside a single transaction
    ///
    /// Documents with blank required fields are skipped. Returns the number of
    /// documents written; on a database error nothing is committed.
    fn upsert_batch(&mut self, documents: &[Document]) -> StorageResult<usize>;

    /// Ranked full-text search over title, body, snippet and summary
    ///
    /// Results are ordered best match first and capped at `limit`. An empty
    /// or syntactically invalid query yields an empty list.
    fn search(&self, query: &str, limit: usize) -> StorageResult<Vec<SearchHit>>;

    /// Gets the document stored for a URL
    fn get(&self, url: &str) -> StorageResult<Option<Document>>;

    /// Counts stored documents
    fn count(&self) -> StorageResult<u64>;

    // ===== Statistics =====

    /// Counts documents per source engine
    fn count_by_source(&self) -> StorageResult<HashMap<String, u64>>;

    /// Counts documents carrying a summary
    fn count_with_summary(&self) -> StorageResult<u64>;

    // ===== Run Management =====

    /// Creates a new crawl run in the `running` state
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Records the final status and counters of a run
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        pages_processed: u64,
        documents_indexed: u64,
    ) -> StorageResult<()>;

    /// Gets the most recent run
    fn latest_run(&self) -> StorageResult<Option<RunRecord>>;
}
