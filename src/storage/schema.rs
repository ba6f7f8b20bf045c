//! Database schema definitions
//!
//! This module contains the SQL schema for the document index and the
//! helpers that build FTS5 queries.

use crate::storage::{StorageError, StorageResult};
use rusqlite::Connection;

/// Current schema version, stored in `PRAGMA user_version`
pub const SCHEMA_VERSION: u32 = 1;

/// SQL schema for the database
///
/// `unicode61 remove_diacritics 2` folds case and diacritics so "café"
/// matches "cafe". Only title, body, snippet and summary are indexed.
pub const SCHEMA_SQL: &str = r#"
-- Full-text document index, one row per URL
CREATE VIRTUAL TABLE IF NOT EXISTS documents USING fts5(
    url UNINDEXED,
    title,
    body,
    snippet,
    summary,
    source_engine UNINDEXED,
    crawled_timestamp UNINDEXED,
    tokenize = "unicode61 remove_diacritics 2"
);

-- Track crawl runs
CREATE TABLE IF NOT EXISTS crawl_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    pages_processed INTEGER NOT NULL DEFAULT 0,
    documents_indexed INTEGER NOT NULL DEFAULT 0
);
"#;

/// Initializes the database schema
///
/// A fresh database (version 0) is stamped with `SCHEMA_VERSION`. Opening a
/// database written by a different schema version is an error.
pub fn initialize_schema(conn: &Connection) -> StorageResult<()> {
    let version: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if version != 0 && version != SCHEMA_VERSION {
        return Err(StorageError::SchemaVersion {
            found: version,
            expected: SCHEMA_VERSION,
        });
    }

    conn.execute_batch(SCHEMA_SQL)?;

    if version == 0 {
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    }

    Ok(())
}

/// Converts free text into an FTS5 query that is always syntactically valid
///
/// Each whitespace-separated token becomes a quoted string, so operators and
/// punctuation in user input are matched literally. Tokens are implicitly
/// ANDed. Tokens without any alphanumeric character are dropped.
///
/// # Examples
///
/// ```
/// use aisans_crawler::storage::to_match_query;
///
/// assert_eq!(to_match_query("apples AND"), r#""apples" "AND""#);
/// assert_eq!(to_match_query(r#"say "hi""#), r#""say" """hi""""#);
/// assert_eq!(to_match_query("  - "), "");
/// ```
pub fn to_match_query(text: &str) -> String {
    text.split_whitespace()
        .filter(|token| token.chars().any(char::is_alphanumeric))
        .map(|token| format!("\"{}\"", token.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(" ")
}
