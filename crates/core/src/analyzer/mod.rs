// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Metric analyzers.
//!
//! Every analyzer implements [`Analyzer`]: it reads a shared
//! [`DataProvider`] and returns a flat metrics map. The set is closed and
//! ordered by [`AnalyzerKind`]; [`AnalyzerRegistry`] holds the enabled ones.

pub mod backlog;
pub mod creep;
pub mod scope;
pub mod status;

pub use backlog::{BacklogAnalyzer, Granularity};
pub use creep::TimeCreepAnalyzer;
pub use scope::ScopeAnalyzer;
pub use status::StatusAnalyzer;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::clock::SharedClock;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::provider::DataProvider;
use crate::text::SharedTextGenerator;

/// Metric name to value.
pub type Metrics = serde_json::Map<String, Value>;

/// Closed set of analyzers, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum AnalyzerKind {
    /// Issue counts and effort per project.
    Scope,
    /// Time in status and coding time.
    Status,
    /// Revisions of committed dates.
    TimeCreep,
    /// Added versus completed backlog items over time.
    Backlog,
}

impl AnalyzerKind {
    pub const ALL: [AnalyzerKind; 4] = [
        AnalyzerKind::Scope,
        AnalyzerKind::Status,
        AnalyzerKind::TimeCreep,
        AnalyzerKind::Backlog,
    ];

    /// Returns the string representation used in reports and flags.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyzerKind::Scope => "scope",
            AnalyzerKind::Status => "status",
            AnalyzerKind::TimeCreep => "time_creep",
            AnalyzerKind::Backlog => "backlog",
        }
    }

    /// Metric keys every successful result of this kind must contain.
    pub fn required_keys(&self) -> &'static [&'static str] {
        match self {
            AnalyzerKind::Scope => &["total_issues", "projects", "concentration_index"],
            AnalyzerKind::Status => &["issues", "total_coding_days"],
            AnalyzerKind::TimeCreep => &["events", "slip_events", "total_slip_days"],
            AnalyzerKind::Backlog => &["series", "total_added", "total_completed"],
        }
    }
}

impl fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AnalyzerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "scope" => Ok(AnalyzerKind::Scope),
            "status" => Ok(AnalyzerKind::Status),
            "time_creep" | "creep" => Ok(AnalyzerKind::TimeCreep),
            "backlog" => Ok(AnalyzerKind::Backlog),
            _ => Err(Error::InvalidAnalyzer(s.to_string())),
        }
    }
}

/// Output of one analyzer for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct AnalyzerResult {
    pub kind: AnalyzerKind,
    pub metrics: Metrics,
    /// Cause of failure; metrics are empty when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl AnalyzerResult {
    pub fn success(kind: AnalyzerKind, metrics: Metrics) -> Self {
        AnalyzerResult {
            kind,
            metrics,
            failure: None,
        }
    }

    pub fn failed(kind: AnalyzerKind, reason: impl Into<String>) -> Self {
        AnalyzerResult {
            kind,
            metrics: Metrics::new(),
            failure: Some(reason.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

/// A metric analyzer.
pub trait Analyzer: Send + Sync {
    fn kind(&self) -> AnalyzerKind;

    fn analyze(&self, provider: &DataProvider<'_>) -> Result<Metrics>;
}

/// Ordered set of analyzers to run.
#[derive(Default)]
pub struct AnalyzerRegistry {
    analyzers: Vec<Box<dyn Analyzer>>,
}

impl AnalyzerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the enabled analyzers from configuration, in kind order.
    pub fn from_config(config: &Config, clock: SharedClock, text: SharedTextGenerator) -> Self {
        Self::for_kinds(&config.analyzers.enabled, config, clock, text)
    }

    /// Builds the given analyzers, in kind order, ignoring repeats.
    pub fn for_kinds(
        kinds: &[AnalyzerKind],
        config: &Config,
        clock: SharedClock,
        text: SharedTextGenerator,
    ) -> Self {
        let mut registry = AnalyzerRegistry::new();
        for kind in AnalyzerKind::ALL.into_iter().filter(|k| kinds.contains(k)) {
            let analyzer: Box<dyn Analyzer> = match kind {
                AnalyzerKind::Scope => Box::new(ScopeAnalyzer::new(config.scope.clone())),
                AnalyzerKind::Status => {
                    Box::new(StatusAnalyzer::new(config.status.clone(), clock.clone()))
                }
                AnalyzerKind::TimeCreep => {
                    Box::new(TimeCreepAnalyzer::new(config.creep.clone(), text.clone()))
                }
                AnalyzerKind::Backlog => Box::new(BacklogAnalyzer::new(config.backlog.clone())),
            };
            registry = registry.with(analyzer);
        }
        registry
    }

    /// Appends an analyzer (builder pattern).
    pub fn with(mut self, analyzer: Box<dyn Analyzer>) -> Self {
        self.analyzers.push(analyzer);
        self
    }

    pub fn analyzers(&self) -> &[Box<dyn Analyzer>] {
        &self.analyzers
    }

    pub fn kinds(&self) -> Vec<AnalyzerKind> {
        self.analyzers.iter().map(|a| a.kind()).collect()
    }

    pub fn len(&self) -> usize {
        self.analyzers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }
}

/// Rounds to two decimals for stable, readable output.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
