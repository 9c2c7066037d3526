// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end report generation for one epic.
//!
//! populate → composite cache decision → tree → analyzers → qualitative
//! summary → merge → persist. A reused composite short-circuits everything
//! after the cache decision; a failure anywhere leaves the stored composite
//! untouched.

use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::analyzer::AnalyzerRegistry;
use crate::clock::SharedClock;
use crate::config::Config;
use crate::context::build_context;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::merge::{CacheDecision, CompositeParts, CompositeSummary, MergeOutcome, SummaryMerger};
use crate::populate::{PopulationReport, Populator};
use crate::provider::DataProvider;
use crate::runner::{AnalysisRunner, CancelToken};
use crate::source::RecordSource;
use crate::staleness::{StalenessDirective, StalenessPolicy};
use crate::text::SharedTextGenerator;
use crate::tree::Tree;

/// Outcome of a pipeline run.
#[derive(Debug, Clone)]
pub struct Report {
    /// The composite document, exactly as stored.
    pub document: String,
    pub composite: CompositeSummary,
    /// True when the stored composite was returned without recomputation.
    pub reused: bool,
    /// Present when a record source was attached.
    pub population: Option<PopulationReport>,
}

pub struct Pipeline<'a> {
    db: &'a Database,
    source: Option<&'a mut dyn RecordSource>,
    registry: AnalyzerRegistry,
    policy: StalenessPolicy,
    merger: SummaryMerger,
    text: SharedTextGenerator,
    artifacts: BTreeMap<String, String>,
}

impl<'a> Pipeline<'a> {
    pub fn new(db: &'a Database, config: &Config, clock: SharedClock, text: SharedTextGenerator) -> Self {
        Pipeline {
            db,
            source: None,
            registry: AnalyzerRegistry::from_config(config, clock.clone(), text.clone()),
            policy: StalenessPolicy::new(&config.staleness, clock.clone()),
            merger: SummaryMerger::new(clock),
            text,
            artifacts: BTreeMap::new(),
        }
    }

    /// Attaches the source used to refresh records (builder pattern).
    pub fn with_source(mut self, source: &'a mut dyn RecordSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Replaces the analyzer set (builder pattern).
    pub fn with_registry(mut self, registry: AnalyzerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Records artifact paths in the composite (builder pattern).
    pub fn with_artifacts(mut self, artifacts: BTreeMap<String, String>) -> Self {
        self.artifacts = artifacts;
        self
    }

    pub fn run(
        &mut self,
        epic_id: &str,
        directive: StalenessDirective,
        cancel: &CancelToken,
    ) -> Result<Report> {
        let population = match self.source.as_deref_mut() {
            Some(source) => Some(
                Populator::new(self.db, source, self.policy.clone()).populate(epic_id, directive)?,
            ),
            None => None,
        };

        let prior = self.db.latest_composite(epic_id)?;
        let refresh = self.policy.should_refresh(
            directive,
            "composite",
            epic_id,
            prior.as_ref().map(|p| p.generated_at),
        )?;
        let decision = if refresh {
            CacheDecision::Recompute
        } else {
            CacheDecision::Reuse
        };

        if let (CacheDecision::Reuse, Some(prior)) = (decision, prior.as_ref()) {
            let document = SummaryMerger::reuse(prior).document().to_string();
            let composite = serde_json::from_str(&document)
                .map_err(|e| Error::CorruptedData(format!("stored composite for {epic_id}: {e}")))?;
            info!(epic = epic_id, generated_at = %prior.generated_at, "composite reused");
            return Ok(Report {
                document,
                composite,
                reused: true,
                population,
            });
        }

        let cancelled = || {
            if cancel.is_cancelled() {
                Err(Error::Cancelled)
            } else {
                Ok(())
            }
        };
        cancelled()?;
        let tree = Tree::build(epic_id, self.db)?;
        let provider = DataProvider::new(&tree);
        let results = AnalysisRunner::run(&provider, &self.registry, cancel)?;
        let qualitative = self.qualitative_summary(&provider);
        cancelled()?;

        let parts = CompositeParts::new(&provider, results)
            .with_qualitative_summary(qualitative)
            .with_artifacts(self.artifacts.clone());
        let MergeOutcome::Fresh { composite, document } =
            self.merger.merge(parts, decision, prior.as_ref())?
        else {
            return Err(Error::CorruptedData(format!(
                "unexpected composite reuse for {epic_id}"
            )));
        };

        self.db
            .store_composite(epic_id, &composite.generated_at, &document)?;
        info!(
            epic = epic_id,
            issues = provider.node_count(),
            generated_at = %composite.generated_at,
            "composite stored"
        );
        Ok(Report {
            document,
            composite: *composite,
            reused: false,
            population,
        })
    }

    fn qualitative_summary(&self, provider: &DataProvider<'_>) -> Option<String> {
        let context = match serde_json::to_string_pretty(&build_context(provider)) {
            Ok(context) => context,
            Err(e) => {
                warn!(error = %e, "failed to serialize summary context");
                return None;
            }
        };
        match self.text.summarize(&context) {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(epic = provider.epic_id(), error = %e, "qualitative summary unavailable");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
