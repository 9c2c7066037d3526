// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Backlog evolution: cumulative added versus completed items per bucket.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;

use super::{Analyzer, AnalyzerKind, Metrics};
use crate::config::BacklogConfig;
use crate::error::{Error, Result};
use crate::issue::{IssueRecord, Status};
use crate::provider::DataProvider;

/// Bucket size of the backlog series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Daily,
    /// Weeks starting on Monday.
    Weekly,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
        }
    }

    /// First day of the bucket containing `date`.
    pub fn bucket(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Daily => date,
            Granularity::Weekly => {
                date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
            }
        }
    }

    fn step(&self) -> Duration {
        match self {
            Granularity::Daily => Duration::days(1),
            Granularity::Weekly => Duration::days(7),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" => Ok(Granularity::Daily),
            "weekly" | "week" => Ok(Granularity::Weekly),
            _ => Err(Error::InvalidGranularity(s.to_string())),
        }
    }
}

/// One point of the cumulative series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacklogPoint {
    pub bucket: NaiveDate,
    pub added: usize,
    pub completed: usize,
    pub active: usize,
}

pub struct BacklogAnalyzer {
    config: BacklogConfig,
}

impl BacklogAnalyzer {
    pub fn new(config: BacklogConfig) -> Self {
        BacklogAnalyzer { config }
    }

    fn completed_at(record: &IssueRecord) -> Option<DateTime<Utc>> {
        if record.status.is_terminal() {
            record.last_terminal_transition()
        } else {
            None
        }
    }

    /// Builds the cumulative series from creation and completion instants.
    pub fn series(
        &self,
        added: &[DateTime<Utc>],
        completed: &[DateTime<Utc>],
    ) -> Vec<BacklogPoint> {
        let granularity = self.config.granularity;
        let bucket_of = |at: &DateTime<Utc>| granularity.bucket(at.date_naive());
        let Some(first) = added.iter().map(bucket_of).min() else {
            return Vec::new();
        };
        let last = added
            .iter()
            .chain(completed)
            .map(bucket_of)
            .max()
            .unwrap_or(first);

        let mut points = Vec::new();
        let mut bucket = first;
        while bucket <= last {
            let added_so_far = added.iter().filter(|at| bucket_of(*at) <= bucket).count();
            let completed_so_far = completed.iter().filter(|at| bucket_of(*at) <= bucket).count();
            points.push(BacklogPoint {
                bucket,
                added: added_so_far,
                completed: completed_so_far,
                active: added_so_far.saturating_sub(completed_so_far),
            });
            bucket += granularity.step();
        }
        points
    }
}

impl Analyzer for BacklogAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Backlog
    }

    fn analyze(&self, provider: &DataProvider<'_>) -> Result<Metrics> {
        // Items without a creation time cannot be placed on the series.
        let items: Vec<&IssueRecord> = provider
            .descendants()
            .filter(|r| self.config.issue_types.contains(&r.issue_type))
            .filter(|r| r.created().is_some())
            .collect();

        let added: Vec<DateTime<Utc>> = items.iter().filter_map(|r| r.created()).collect();
        let completed: Vec<DateTime<Utc>> =
            items.iter().filter_map(|r| Self::completed_at(r)).collect();

        let refinement_start = items
            .iter()
            .flat_map(|r| r.sorted_activities())
            .filter(|a| a.new_status() == Some(Status::Refinement))
            .map(|a| a.at)
            .min();
        let finish = if !items.is_empty() && completed.len() == items.len() {
            completed.iter().max().copied()
        } else {
            None
        };

        let mut metrics = Metrics::new();
        metrics.insert("granularity".into(), json!(self.config.granularity));
        metrics.insert(
            "series".into(),
            serde_json::to_value(self.series(&added, &completed))?,
        );
        metrics.insert("total_added".into(), json!(added.len()));
        metrics.insert("total_completed".into(), json!(completed.len()));
        metrics.insert("refinement_start".into(), json!(refinement_start));
        metrics.insert("finish".into(), json!(finish));
        Ok(metrics)
    }
}

#[cfg(test)]
#[path = "backlog_tests.rs"]
mod tests;
