// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Analysis configuration.
//!
//! Every section has documented defaults, so an empty document is a valid
//! configuration. Components receive the section they need at construction.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analyzer::{AnalyzerKind, Granularity};
use crate::issue::{IssueType, Status};

/// Complete analysis configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub staleness: StalenessConfig,
    pub status: StatusConfig,
    pub creep: CreepConfig,
    pub backlog: BacklogConfig,
    pub scope: ScopeConfig,
    pub analyzers: AnalyzersConfig,
    pub text: TextConfig,
}

/// Freshness thresholds for cached records and composites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StalenessConfig {
    /// Age in days after which a cached artifact is stale (default: 7).
    pub window_days: i64,
    /// Days after a terminal transition during which a closed issue is still
    /// re-fetched under `check` (default: 0, disabled).
    pub closed_grace_days: i64,
}

impl Default for StalenessConfig {
    fn default() -> Self {
        StalenessConfig {
            window_days: 7,
            closed_grace_days: 0,
        }
    }
}

impl StalenessConfig {
    pub fn window(&self) -> Duration {
        Duration::days(self.window_days)
    }

    pub fn closed_grace(&self) -> Duration {
        Duration::days(self.closed_grace_days)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Statuses whose durations add up to coding time (default: in_progress).
    pub coding_statuses: Vec<Status>,
}

impl Default for StatusConfig {
    fn default() -> Self {
        StatusConfig {
            coding_statuses: vec![Status::InProgress],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreepConfig {
    /// Issue types whose schedule fields are tracked (default: epic-like types).
    pub issue_types: Vec<IssueType>,
    /// Program increment that starts the anchor year's first quarter (default: 27).
    pub pi_base_number: u32,
    /// Calendar year of the anchor increment (default: 2025).
    pub pi_base_year: i32,
}

impl Default for CreepConfig {
    fn default() -> Self {
        CreepConfig {
            issue_types: vec![
                IssueType::BusinessEpic,
                IssueType::PortfolioEpic,
                IssueType::Initiative,
                IssueType::Epic,
            ],
            pi_base_number: 27,
            pi_base_year: 2025,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacklogConfig {
    /// Issue types counted as backlog items (default: story).
    pub issue_types: Vec<IssueType>,
    /// Bucket size of the series (default: daily).
    pub granularity: Granularity,
}

impl Default for BacklogConfig {
    fn default() -> Self {
        BacklogConfig {
            issue_types: vec![IssueType::Story],
            granularity: Granularity::Daily,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// Maps key prefixes onto a consolidated project name.
    pub project_names: BTreeMap<String, String>,
}

impl ScopeConfig {
    /// Display name for a key prefix; unmapped prefixes stand for themselves.
    pub fn project_name<'a>(&'a self, prefix: &'a str) -> &'a str {
        self.project_names
            .get(prefix)
            .map(String::as_str)
            .unwrap_or(prefix)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzersConfig {
    /// Analyzers to run (default: all).
    pub enabled: Vec<AnalyzerKind>,
}

impl Default for AnalyzersConfig {
    fn default() -> Self {
        AnalyzersConfig {
            enabled: AnalyzerKind::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// External summariser: program followed by its arguments. The context is
    /// written to its stdin and the summary read from its stdout.
    pub command: Vec<String>,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
