// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::{Path, PathBuf};

use epicscope_core::{system_clock, Database, JsonDirSource, SharedClock};
use tracing::{debug, info};

use crate::cli::GlobalArgs;
use crate::error::{Error, Result};

use super::open_db;

pub fn run(global: &GlobalArgs, paths: &[PathBuf]) -> Result<()> {
    let (db, _) = open_db(global)?;
    let keys = run_impl(&db, paths, &system_clock())?;
    println!("Imported {} record(s)", keys.len());
    Ok(())
}

/// Expand directories into their `.json` files; plain paths pass through.
pub(crate) fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let found = JsonDirSource::json_files(path)?;
            if found.is_empty() {
                return Err(Error::NothingToImport(path.display().to_string()));
            }
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

/// Internal implementation that accepts db for testing.
///
/// Every file is parsed before anything is stored and the records are
/// written in one transaction, so a failed import leaves the store untouched. Returns the imported keys in file order.
pub(crate) fn run_impl(db: &Database, paths: &[PathBuf], clock: &SharedClock) -> Result<Vec<String>> {
    let records = collect_files(paths)?
        .iter()
        .map(|file| read_record(file, clock))
        .collect::<Result<Vec<_>>>()?;

    let stored = db.store_records(&records)?;
    for record in &records {
        info!(key = %record.key, retrieved_at = %record.retrieved_at, "imported record");
    }
    debug!(files = records.len(), stored, "import committed");
    Ok(records.into_iter().map(|r| r.key).collect())
}

fn read_record(path: &Path, clock: &SharedClock) -> Result<epicscope_core::IssueRecord> {
    JsonDirSource::read_file(path, clock).map_err(|e| Error::InvalidRecord {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[path = "import_tests.rs"]
mod tests;
