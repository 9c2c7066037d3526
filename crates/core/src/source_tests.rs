// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::clock::FixedClock;
use crate::issue::{IssueType, Status};
use chrono::{TimeZone, Utc};
use std::sync::Arc;
use tempfile::TempDir;

fn clock() -> SharedClock {
    Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
    ))
}

fn write(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

#[test]
fn fetch_reads_key_named_file_and_stamps_retrieval() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "PAY-1.json",
        r#"{"key": "PAY-1", "issue_type": "Story", "title": "Cart", "status": "Open"}"#,
    );

    let mut source = JsonDirSource::new(temp.path(), clock());
    let record = source.fetch("PAY-1").unwrap().unwrap();

    assert_eq!(record.issue_type, IssueType::Story);
    assert_eq!(record.status, Status::Open);
    assert_eq!(record.retrieved_at, clock().now());
}

#[test]
fn fetch_keeps_existing_retrieval_stamp() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "PAY-1.json",
        r#"{"key": "PAY-1", "issue_type": "story", "title": "Cart", "status": "open",
            "retrieved_at": "2024-01-02T03:04:05Z"}"#,
    );

    let mut source = JsonDirSource::new(temp.path(), clock());
    let record = source.fetch("PAY-1").unwrap().unwrap();

    assert_eq!(
        record.retrieved_at,
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    );
}

#[test]
fn fetch_falls_back_to_scanning_by_key() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "export_17.json",
        r#"{"key": "WEB-9", "issue_type": "Bug", "title": "Crash", "status": "Done"}"#,
    );
    write(temp.path(), "notes.json", "not a record");

    let mut source = JsonDirSource::new(temp.path(), clock());

    assert_eq!(source.fetch("WEB-9").unwrap().unwrap().key, "WEB-9");
    assert!(source.fetch("WEB-10").unwrap().is_none());
}

#[test]
fn malformed_key_file_is_an_error() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "PAY-1.json", "{");

    let mut source = JsonDirSource::new(temp.path(), clock());
    assert!(source.fetch("PAY-1").is_err());
}

#[test]
fn hash_map_lookup() {
    let mut records = HashMap::new();
    let record = IssueRecord::new("PAY-1", IssueType::Story, "Cart", Status::Open, clock().now());
    records.insert("PAY-1".to_string(), record.clone());

    assert_eq!(records.lookup("PAY-1").unwrap(), Some(record));
    assert_eq!(records.lookup("PAY-2").unwrap(), None);
}

#[test]
fn database_lookup_returns_latest() {
    let db = Database::open_in_memory().unwrap();
    let record = IssueRecord::new("PAY-1", IssueType::Story, "Cart", Status::Open, clock().now());
    db.store_record(&record).unwrap();

    assert_eq!(db.lookup("PAY-1").unwrap(), Some(record));
    assert_eq!(db.lookup("PAY-2").unwrap(), None);
}
