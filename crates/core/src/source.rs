// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Record source and lookup seams.
//!
//! [`RecordSource`] is the fetching collaborator (slow, sequential, may miss);
//! [`RecordLookup`] is the local view used by the tree builder and the
//! staleness checks.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::clock::{ClockSource, SharedClock};
use crate::db::Database;
use crate::error::Result;
use crate::issue::IssueRecord;

/// Read access to locally known records.
pub trait RecordLookup {
    /// Returns the newest known snapshot of `key`, or `None` when absent.
    fn lookup(&self, key: &str) -> Result<Option<IssueRecord>>;
}

impl RecordLookup for Database {
    fn lookup(&self, key: &str) -> Result<Option<IssueRecord>> {
        self.latest_record(key)
    }
}

impl RecordLookup for HashMap<String, IssueRecord> {
    fn lookup(&self, key: &str) -> Result<Option<IssueRecord>> {
        Ok(self.get(key).cloned())
    }
}

impl<L: RecordLookup + ?Sized> RecordLookup for &L {
    fn lookup(&self, key: &str) -> Result<Option<IssueRecord>> {
        (**self).lookup(key)
    }
}

/// Fetches fresh records from outside the store.
pub trait RecordSource {
    /// Fetches `key`; `Ok(None)` means the source does not know the issue.
    fn fetch(&mut self, key: &str) -> Result<Option<IssueRecord>>;
}

/// Reads records exported as one JSON document per issue.
///
/// Files are looked up as `<dir>/<KEY>.json`; when that file is missing the
/// directory is scanned once for a document whose `key` matches. Documents
/// without `retrieved_at` are stamped with the clock.
pub struct JsonDirSource {
    dir: PathBuf,
    clock: SharedClock,
    index: Option<HashMap<String, PathBuf>>,
}

impl JsonDirSource {
    pub fn new(dir: &Path, clock: SharedClock) -> Self {
        JsonDirSource {
            dir: dir.to_path_buf(),
            clock,
            index: None,
        }
    }

    /// Reads a single record document, stamping `retrieved_at` if absent.
    pub fn read_file(path: &Path, clock: &SharedClock) -> Result<IssueRecord> {
        let content = fs::read_to_string(path)?;
        let mut value: serde_json::Value = serde_json::from_str(&content)?;
        if let Some(object) = value.as_object_mut() {
            if !object.contains_key("retrieved_at") {
                object.insert(
                    "retrieved_at".to_string(),
                    serde_json::to_value(clock.now())?,
                );
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Lists every `.json` file in a directory, sorted by name.
    pub fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();
        Ok(files)
    }

    fn scan(&mut self) -> Result<&HashMap<String, PathBuf>> {
        if self.index.is_none() {
            let mut index = HashMap::new();
            for path in Self::json_files(&self.dir)? {
                match Self::read_file(&path, &self.clock) {
                    Ok(record) => {
                        index.entry(record.key).or_insert(path);
                    }
                    Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable record"),
                }
            }
            self.index = Some(index);
        }
        Ok(self.index.get_or_insert_with(HashMap::new))
    }
}

impl RecordSource for JsonDirSource {
    fn fetch(&mut self, key: &str) -> Result<Option<IssueRecord>> {
        let direct = self.dir.join(format!("{key}.json"));
        if direct.is_file() {
            debug!(key, path = %direct.display(), "reading record");
            return Self::read_file(&direct, &self.clock).map(Some);
        }

        let path = self.scan()?.get(key).cloned();
        match path {
            Some(path) => Self::read_file(&path, &self.clock).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
