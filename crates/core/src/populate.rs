// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Record population.
//!
//! Walks the hierarchy from the root, one key at a time, deciding per key
//! whether the cached record may be used or a fresh one must be fetched.
//! Fetched records are stored as new versions; links are followed from
//! whichever version is in hand.

use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, warn};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::issue::IssueRecord;
use crate::source::RecordSource;
use crate::staleness::{StalenessDirective, StalenessPolicy};

/// What a population pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PopulationReport {
    /// Keys fetched from the source and stored.
    pub fetched: Vec<String>,
    /// Keys served from the store.
    pub reused: Vec<String>,
    /// Keys neither the source nor the store could provide.
    pub missing: Vec<String>,
}

pub struct Populator<'a> {
    db: &'a Database,
    source: &'a mut dyn RecordSource,
    policy: StalenessPolicy,
}

impl<'a> Populator<'a> {
    pub fn new(db: &'a Database, source: &'a mut dyn RecordSource, policy: StalenessPolicy) -> Self {
        Populator { db, source, policy }
    }

    /// Ensures every record reachable from `root` is present in the store.
    pub fn populate(&mut self, root: &str, directive: StalenessDirective) -> Result<PopulationReport> {
        let mut report = PopulationReport::default();
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = VecDeque::new();
        visited.insert(root.to_string());
        queue.push_back(root.to_string());

        while let Some(key) = queue.pop_front() {
            let Some(record) = self.resolve(&key, key == root, directive, &mut report)? else {
                continue;
            };
            for link in record.children.iter().chain(&record.realized_by) {
                if visited.insert(link.key.clone()) {
                    queue.push_back(link.key.clone());
                }
            }
        }

        info!(
            root,
            fetched = report.fetched.len(),
            reused = report.reused.len(),
            missing = report.missing.len(),
            "population complete"
        );
        Ok(report)
    }

    fn resolve(
        &mut self,
        key: &str,
        is_root: bool,
        directive: StalenessDirective,
        report: &mut PopulationReport,
    ) -> Result<Option<IssueRecord>> {
        let local = self.db.latest_record(key)?;
        let refresh = match self.policy.should_refresh_issue(directive, key, local.as_ref()) {
            Ok(refresh) => refresh,
            Err(Error::NoCachedArtifact { .. }) if !is_root => {
                warn!(key, "no cached record under skip");
                report.missing.push(key.to_string());
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        if !refresh {
            report.reused.push(key.to_string());
            return Ok(local);
        }

        match self.source.fetch(key)? {
            Some(record) => {
                report.fetched.push(key.to_string());
                if self.db.store_record(&record)? {
                    debug!(key, retrieved_at = %record.retrieved_at, "stored fetched record");
                    Ok(Some(record))
                } else {
                    // Same snapshot already stored; the stored body stands.
                    debug!(key, retrieved_at = %record.retrieved_at, "snapshot already stored");
                    Ok(self.db.latest_record(key)?)
                }
            }
            None if local.is_some() => {
                warn!(key, "source has no record, using cached version");
                report.reused.push(key.to_string());
                Ok(local)
            }
            None => {
                warn!(key, "record not found");
                report.missing.push(key.to_string());
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
#[path = "populate_tests.rs"]
mod tests;
