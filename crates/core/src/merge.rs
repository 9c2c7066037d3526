// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Composite assembly.
//!
//! Merge rules:
//! - `Reuse` with a stored composite returns the stored document untouched
//! - every successful result must carry its analyzer's required keys
//! - failed results are kept, with their failure reason and no metrics
//! - `data_as_of` is the newest source snapshot time
//!
//! Identical inputs produce identical documents except for `generated_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::analyzer::{AnalyzerKind, AnalyzerResult};
use crate::clock::{ClockSource, SharedClock};
use crate::db::StoredComposite;
use crate::error::{Error, Result};
use crate::provider::DataProvider;

/// The merged report for one epic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct CompositeSummary {
    pub epic_id: String,
    pub generated_at: DateTime<Utc>,
    /// Newest `retrieved_at` among the records analyzed.
    pub data_as_of: Option<DateTime<Utc>>,
    /// Snapshot time of every record analyzed, by key.
    pub source_timestamps: BTreeMap<String, DateTime<Utc>>,
    pub results: BTreeMap<AnalyzerKind, AnalyzerResult>,
    pub qualitative_summary: Option<String>,
    /// Artifact name to path, recorded verbatim.
    #[serde(default)]
    pub artifacts: BTreeMap<String, String>,
}

/// Whether a stored composite may stand in for a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecision {
    Reuse,
    Recompute,
}

/// Everything a fresh composite is assembled from.
#[derive(Debug, Clone, Default)]
pub struct CompositeParts {
    pub epic_id: String,
    pub source_timestamps: BTreeMap<String, DateTime<Utc>>,
    pub results: BTreeMap<AnalyzerKind, AnalyzerResult>,
    pub qualitative_summary: Option<String>,
    pub artifacts: BTreeMap<String, String>,
}

impl CompositeParts {
    pub fn new(provider: &DataProvider<'_>, results: BTreeMap<AnalyzerKind, AnalyzerResult>) -> Self {
        CompositeParts {
            epic_id: provider.epic_id().to_string(),
            source_timestamps: provider.source_timestamps(),
            results,
            qualitative_summary: None,
            artifacts: BTreeMap::new(),
        }
    }

    pub fn with_qualitative_summary(mut self, summary: Option<String>) -> Self {
        self.qualitative_summary = summary;
        self
    }

    pub fn with_artifacts(mut self, artifacts: BTreeMap<String, String>) -> Self {
        self.artifacts = artifacts;
        self
    }
}

/// Result of a merge.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// The stored document, byte for byte.
    Reused(String),
    Fresh {
        composite: Box<CompositeSummary>,
        document: String,
    },
}

impl MergeOutcome {
    pub fn document(&self) -> &str {
        match self {
            MergeOutcome::Reused(document) => document,
            MergeOutcome::Fresh { document, .. } => document,
        }
    }

    pub fn is_reused(&self) -> bool {
        matches!(self, MergeOutcome::Reused(_))
    }
}

pub struct SummaryMerger {
    clock: SharedClock,
}

impl SummaryMerger {
    pub fn new(clock: SharedClock) -> Self {
        SummaryMerger { clock }
    }

    /// Merges analyzer output into a composite, or reuses the stored one.
    pub fn merge(
        &self,
        parts: CompositeParts,
        decision: CacheDecision,
        prior: Option<&StoredComposite>,
    ) -> Result<MergeOutcome> {
        if let (CacheDecision::Reuse, Some(prior)) = (decision, prior) {
            return Ok(Self::reuse(prior));
        }
        let composite = self.assemble(parts)?;
        let document = serde_json::to_string_pretty(&composite)?;
        Ok(MergeOutcome::Fresh {
            composite: Box::new(composite),
            document,
        })
    }

    /// Returns the stored document unchanged.
    pub fn reuse(prior: &StoredComposite) -> MergeOutcome {
        debug!(epic = %prior.epic_id, generated_at = %prior.generated_at, "reusing composite");
        MergeOutcome::Reused(prior.document.clone())
    }

    fn assemble(&self, parts: CompositeParts) -> Result<CompositeSummary> {
        for (kind, result) in &parts.results {
            validate(*kind, result)?;
        }
        let data_as_of = parts.source_timestamps.values().max().copied();
        Ok(CompositeSummary {
            epic_id: parts.epic_id,
            generated_at: self.clock.now(),
            data_as_of,
            source_timestamps: parts.source_timestamps,
            results: parts.results,
            qualitative_summary: parts.qualitative_summary,
            artifacts: parts.artifacts,
        })
    }
}

fn validate(kind: AnalyzerKind, result: &AnalyzerResult) -> Result<()> {
    let inconsistency = |reason: String| Error::MergeInconsistency {
        kind: kind.to_string(),
        reason,
    };
    if result.kind != kind {
        return Err(inconsistency(format!("result filed under {}", result.kind)));
    }
    if result.is_failure() {
        return Ok(());
    }
    let missing: Vec<&str> = kind
        .required_keys()
        .iter()
        .filter(|key| !result.metrics.contains_key(**key))
        .copied()
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(inconsistency(format!("missing metrics: {}", missing.join(", "))))
    }
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod tests;
