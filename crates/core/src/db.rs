// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed record store.
//!
//! The [`Database`] keeps every retrieved snapshot of an issue and every
//! generated composite document. Rows are never updated: a re-fetch or a
//! recomputation inserts a new version, and readers pick the newest one.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::error::{Error, Result};
use crate::issue::IssueRecord;

/// SQL schema for the record store.
pub const SCHEMA: &str = r#"
-- One row per retrieved snapshot of an issue
CREATE TABLE IF NOT EXISTS records (
    key TEXT NOT NULL,
    retrieved_at TEXT NOT NULL,
    issue_type TEXT NOT NULL,
    status TEXT NOT NULL,
    body TEXT NOT NULL,
    PRIMARY KEY (key, retrieved_at)
);

-- One row per generated composite summary
CREATE TABLE IF NOT EXISTS composites (
    version INTEGER PRIMARY KEY AUTOINCREMENT,
    epic_id TEXT NOT NULL,
    generated_at TEXT NOT NULL,
    document TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_composites_epic ON composites(epic_id, generated_at);

CREATE INDEX IF NOT EXISTS idx_records_status ON records(status);
"#;

/// Formats a timestamp so that text order matches time order.
fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(Error::CorruptedData(format!(
                    "invalid timestamp '{value}' in column '{column}'"
                ))),
            )
        })
}

/// Parse a stored record body.
fn parse_body(value: &str, key: &str) -> std::result::Result<IssueRecord, rusqlite::Error> {
    serde_json::from_str(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid record body for '{key}': {e}"
            ))),
        )
    })
}

/// A persisted composite summary document.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredComposite {
    pub epic_id: String,
    pub generated_at: DateTime<Utc>,
    /// The document text exactly as it was generated.
    pub document: String,
}

/// SQLite database connection with record store operations.
pub struct Database {
    /// The underlying SQLite connection.
    pub conn: Connection,
}

impl Database {
    /// Open a database at the given path, creating the schema if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        conn.execute_batch(SCHEMA)?;
        Ok(Database { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Database { conn })
    }

    /// Store a record snapshot as a new version.
    ///
    /// A snapshot with the same key and retrieval time as a stored one is the
    /// same snapshot; the stored body is kept. Returns whether a row was added.
    pub fn store_record(&self, record: &IssueRecord) -> Result<bool> {
        let body = serde_json::to_string(record)?;
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO records (key, retrieved_at, issue_type, status, body)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.key,
                format_timestamp(&record.retrieved_at),
                record.issue_type.as_str(),
                record.status.as_str(),
                body,
            ],
        )?;
        Ok(inserted > 0)
    }

    /// Store several snapshots in one transaction: all of them or none.
    pub fn store_records(&self, records: &[IssueRecord]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut inserted = 0;
        for record in records {
            if self.store_record(record)? {
                inserted += 1;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Get the newest snapshot of a record, if any.
    pub fn latest_record(&self, key: &str) -> Result<Option<IssueRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT body FROM records WHERE key = ?1
                 ORDER BY retrieved_at DESC LIMIT 1",
                params![key],
                |row| {
                    let body: String = row.get(0)?;
                    parse_body(&body, key)
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Get the newest snapshot of a record.
    pub fn get_record(&self, key: &str) -> Result<IssueRecord> {
        self.latest_record(key)?
            .ok_or_else(|| Error::IssueNotFound(key.to_string()))
    }

    /// Retrieval timestamps of every stored version, oldest first.
    pub fn record_versions(&self, key: &str) -> Result<Vec<DateTime<Utc>>> {
        let mut stmt = self.conn.prepare(
            "SELECT retrieved_at FROM records WHERE key = ?1 ORDER BY retrieved_at",
        )?;
        let versions = stmt
            .query_map(params![key], |row| {
                let at: String = row.get(0)?;
                parse_timestamp(&at, "retrieved_at")
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(versions)
    }

    /// Keys of every stored record, sorted.
    pub fn record_keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT key FROM records ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    /// Store a composite document as a new version.
    ///
    /// Versions sharing a generation time are ordered by insertion.
    pub fn store_composite(
        &self,
        epic_id: &str,
        generated_at: &DateTime<Utc>,
        document: &str,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO composites (epic_id, generated_at, document)
             VALUES (?1, ?2, ?3)",
            params![epic_id, format_timestamp(generated_at), document],
        )?;
        Ok(())
    }

    /// Get the newest composite document for an epic, if any.
    pub fn latest_composite(&self, epic_id: &str) -> Result<Option<StoredComposite>> {
        let composite = self
            .conn
            .query_row(
                "SELECT epic_id, generated_at, document FROM composites
                 WHERE epic_id = ?1 ORDER BY generated_at DESC, version DESC LIMIT 1",
                params![epic_id],
                |row| {
                    let generated: String = row.get(1)?;
                    Ok(StoredComposite {
                        epic_id: row.get(0)?,
                        generated_at: parse_timestamp(&generated, "generated_at")?,
                        document: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(composite)
    }

    /// Number of stored composite versions for an epic.
    pub fn composite_count(&self, epic_id: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM composites WHERE epic_id = ?1",
            params![epic_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
