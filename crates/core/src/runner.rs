// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Parallel analyzer execution.
//!
//! Analyzers fan out over the rayon pool and share one read-only
//! [`DataProvider`]. A failing or panicking analyzer yields a failed
//! [`AnalyzerResult`] for its own kind and never aborts its siblings.
//! Cancellation is cooperative: the token is checked before the fan-out
//! and again at the join point.

use rayon::prelude::*;
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::analyzer::{Analyzer, AnalyzerKind, AnalyzerRegistry, AnalyzerResult};
use crate::error::{Error, Result};
use crate::provider::DataProvider;

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

pub struct AnalysisRunner;

impl AnalysisRunner {
    /// Runs every registered analyzer and collects one result per kind.
    pub fn run(
        provider: &DataProvider<'_>,
        registry: &AnalyzerRegistry,
        cancel: &CancelToken,
    ) -> Result<BTreeMap<AnalyzerKind, AnalyzerResult>> {
        cancel.check()?;
        debug!(epic = provider.epic_id(), analyzers = registry.len(), "running analyzers");

        let results: Vec<AnalyzerResult> = registry
            .analyzers()
            .par_iter()
            .map(|analyzer| Self::run_one(analyzer.as_ref(), provider, cancel))
            .collect();

        cancel.check()?;
        let failed = results.iter().filter(|r| r.is_failure()).count();
        info!(
            epic = provider.epic_id(),
            succeeded = results.len() - failed,
            failed,
            "analysis complete"
        );
        Ok(results.into_iter().map(|r| (r.kind, r)).collect())
    }

    fn run_one(
        analyzer: &dyn Analyzer,
        provider: &DataProvider<'_>,
        cancel: &CancelToken,
    ) -> AnalyzerResult {
        let kind = analyzer.kind();
        if cancel.is_cancelled() {
            return AnalyzerResult::failed(kind, Error::Cancelled.to_string());
        }
        match catch_unwind(AssertUnwindSafe(|| analyzer.analyze(provider))) {
            Ok(Ok(metrics)) => AnalyzerResult::success(kind, metrics),
            Ok(Err(e)) => {
                warn!(analyzer = %kind, error = %e, "analyzer failed");
                AnalyzerResult::failed(kind, e.to_string())
            }
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                warn!(analyzer = %kind, reason = %reason, "analyzer panicked");
                AnalyzerResult::failed(kind, format!("panicked: {}", reason))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
