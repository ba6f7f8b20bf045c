//! SQLite storage implementation
//!
//! This module provides an SQLite FTS5 implementation of the DocumentStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{DocumentStore, StorageError, StorageResult};
use crate::storage::{Document, RunRecord, RunStatus, SearchHit};
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

const DELETE_SQL: &str = "DELETE FROM documents WHERE url = ?1";

const INSERT_SQL: &str = "INSERT INTO documents
    (url, title, body, snippet, summary, source_engine, crawled_timestamp)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

const DOCUMENT_COLUMNS: &str =
    "url, title, body, snippet, summary, source_engine, crawled_timestamp";

/// SQLite FTS5 document store
pub struct SqliteDocumentStore {
    conn: Connection,
}

impl SqliteDocumentStore {
    /// Opens or creates a store at the given path
    ///
    /// Fails if the file is not an SQLite database or was written with a
    /// different schema version.
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory store (for tests and dry runs)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn run_query(&self, query: &str, limit: usize) -> rusqlite::Result<Vec<SearchHit>> {
        // A negative LIMIT means "unbounded" to SQLite
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {}, rank FROM documents WHERE documents MATCH ?1 ORDER BY rank LIMIT ?2",
            DOCUMENT_COLUMNS
        ))?;

        let hits = stmt
            .query_map(params![query, limit], |row| {
                Ok(SearchHit {
                    document: document_from_row(row)?,
                    rank: row.get(7)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(hits)
    }
}

/// Replaces the row for `document.url` (delete-then-insert)
///
/// Callers wrap this in a transaction so the pair is atomic.
fn write_document(conn: &Connection, document: &Document) -> rusqlite::Result<()> {
    conn.prepare_cached(DELETE_SQL)?
        .execute(params![document.url])?;

    conn.prepare_cached(INSERT_SQL)?.execute(params![
        document.url,
        document.title,
        document.body,
        document.snippet,
        document.summary,
        document.source_engine,
        document.crawled_timestamp,
    ])?;

    Ok(())
}

fn document_from_row(row: &Row<'_>) -> rusqlite::Result<Document> {
    Ok(Document {
        url: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        snippet: row.get(3)?,
        summary: row.get(4)?,
        source_engine: row.get(5)?,
        crawled_timestamp: row.get(6)?,
    })
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Failed),
        pages_processed: row.get::<_, i64>(5)? as u64,
        documents_indexed: row.get::<_, i64>(6)? as u64,
    })
}

/// Whether an error is SQLite's generic SQLITE_ERROR, which is what FTS5
/// reports for malformed MATCH expressions
fn is_query_syntax_error(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::Unknown
    )
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl DocumentStore for SqliteDocumentStore {
    // ===== Documents =====

    fn upsert(&mut self, document: &Document) -> StorageResult<()> {
        document.validate()?;

        let tx = self.conn.transaction()?;
        write_document(&tx, document)?;
        tx.commit()?;

        tracing::trace!("Upserted document {}", document.url);
        Ok(())
    }

    fn upsert_batch(&mut self, documents: &[Document]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        let mut written = 0;

        for document in documents {
            if let Some(field) = document.missing_field() {
                tracing::warn!(
                    "Skipping document in batch due to missing field '{}' (URL: {})",
                    field,
                    document.url
                );
                continue;
            }

            write_document(&tx, document)?;
            written += 1;
        }

        // Dropping the transaction on an early return rolls it back
        tx.commit()?;

        tracing::debug!("Batch upsert wrote {} of {} documents", written, documents.len());
        Ok(written)
    }

    fn search(&self, query: &str, limit: usize) -> StorageResult<Vec<SearchHit>> {
        if query.trim().is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        match self.run_query(query, limit) {
            Ok(hits) => Ok(hits),
            Err(e) if is_query_syntax_error(&e) => {
                tracing::debug!("Invalid search query '{}': {}", query, e);
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn get(&self, url: &str) -> StorageResult<Option<Document>> {
        let document = self
            .conn
            .query_row(
                &format!("SELECT {} FROM documents WHERE url = ?1", DOCUMENT_COLUMNS),
                params![url],
                document_from_row,
            )
            .optional()?;

        Ok(document)
    }

    fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Statistics =====

    fn count_by_source(&self) -> StorageResult<HashMap<String, u64>> {
        let mut stmt = self.conn.prepare(
            "SELECT source_engine, COUNT(*) FROM documents GROUP BY source_engine",
        )?;

        let counts = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<rusqlite::Result<HashMap<_, _>>>()?;

        Ok(counts)
    }

    fn count_with_summary(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE summary IS NOT NULL AND summary != ''",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO crawl_runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now_timestamp(), config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        pages_processed: u64,
        documents_indexed: u64,
    ) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE crawl_runs SET status = ?1, finished_at = ?2, pages_processed = ?3,
             documents_indexed = ?4 WHERE id = ?5",
            params![
                status.to_db_string(),
                now_timestamp(),
                pages_processed as i64,
                documents_indexed as i64,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status, pages_processed,
                 documents_indexed FROM crawl_runs ORDER BY id DESC LIMIT 1",
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }
}
