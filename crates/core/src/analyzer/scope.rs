// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Scope analyzer: how big the epic is and how the work spreads over projects.
//!
//! The project dimension comes from the key prefix, consolidated through the
//! configured project name map. The root and any business epic or bug are
//! left out of the distribution.

use serde_json::{json, Value};
use std::collections::BTreeMap;

use super::{round2, Analyzer, AnalyzerKind, Metrics};
use crate::config::ScopeConfig;
use crate::error::Result;
use crate::issue::{IssueRecord, IssueType};
use crate::provider::DataProvider;

pub struct ScopeAnalyzer {
    config: ScopeConfig,
}

#[derive(Default)]
struct ProjectTally {
    issues: usize,
    story_points: f64,
}

impl ScopeAnalyzer {
    pub fn new(config: ScopeConfig) -> Self {
        ScopeAnalyzer { config }
    }

    fn counts_distribution(record: &IssueRecord, root: &str) -> bool {
        record.key != root
            && !matches!(record.issue_type, IssueType::BusinessEpic | IssueType::Bug)
    }

    fn project_distribution(&self, provider: &DataProvider<'_>) -> Vec<(String, ProjectTally)> {
        let root = provider.epic_id();
        let mut tallies: BTreeMap<String, ProjectTally> = BTreeMap::new();
        for record in provider
            .issues()
            .filter(|r| Self::counts_distribution(r, root))
        {
            let name = self.config.project_name(record.project()).to_string();
            let tally = tallies.entry(name).or_default();
            tally.issues += 1;
            tally.story_points += record.story_points.unwrap_or(0.0);
        }

        let mut sorted: Vec<(String, ProjectTally)> = tallies.into_iter().collect();
        sorted.sort_by(|(a_name, a), (b_name, b)| b.issues.cmp(&a.issues).then(a_name.cmp(b_name)));
        sorted
    }

    fn epic_breakdown(provider: &DataProvider<'_>) -> (Value, Vec<usize>) {
        let mut breakdown = serde_json::Map::new();
        let mut stories_per_epic = Vec::new();
        for epic in provider.issues_of_type(&[IssueType::Epic]) {
            let items: Vec<Value> = provider
                .children(&epic.key)
                .into_iter()
                .filter(|c| matches!(c.issue_type, IssueType::Story | IssueType::Bug))
                .map(|c| {
                    json!({
                        "key": c.key,
                        "type": c.issue_type,
                        "points": c.story_points.unwrap_or(0.0),
                        "status": c.status,
                        "resolution": c.resolution,
                    })
                })
                .collect();
            stories_per_epic.push(
                items
                    .iter()
                    .filter(|i| i["type"] == IssueType::Story.as_str())
                    .count(),
            );
            breakdown.insert(epic.key.clone(), Value::Array(items));
        }
        (Value::Object(breakdown), stories_per_epic)
    }
}

impl Analyzer for ScopeAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Scope
    }

    fn analyze(&self, provider: &DataProvider<'_>) -> Result<Metrics> {
        let mut counts_by_type: BTreeMap<&str, usize> = BTreeMap::new();
        for record in provider.issues() {
            *counts_by_type.entry(record.issue_type.as_str()).or_default() += 1;
        }
        let total_issues: usize = counts_by_type.values().sum();
        let total_story_points: f64 = provider
            .issues_of_type(&[IssueType::Story])
            .iter()
            .filter_map(|r| r.story_points)
            .sum();

        let distribution = self.project_distribution(provider);
        let distributed_issues: usize = distribution.iter().map(|(_, t)| t.issues).sum();
        let distributed_points: f64 = distribution.iter().map(|(_, t)| t.story_points).sum();
        let share = |part: f64, whole: f64| if whole > 0.0 { part / whole } else { 0.0 };

        let concentration_index: f64 = distribution
            .iter()
            .map(|(_, t)| share(t.issues as f64, distributed_issues as f64).powi(2))
            .sum();
        let projects: Vec<Value> = distribution
            .iter()
            .map(|(name, t)| {
                json!({
                    "project": name,
                    "issues": t.issues,
                    "story_points": t.story_points,
                    "issue_share": round2(share(t.issues as f64, distributed_issues as f64)),
                    "point_share": round2(share(t.story_points, distributed_points)),
                })
            })
            .collect();

        let (epic_breakdown, stories_per_epic) = Self::epic_breakdown(provider);
        let average_stories = if stories_per_epic.is_empty() {
            0.0
        } else {
            stories_per_epic.iter().sum::<usize>() as f64 / stories_per_epic.len() as f64
        };

        let mut metrics = Metrics::new();
        metrics.insert("total_issues".into(), json!(total_issues));
        metrics.insert("unresolved_issues".into(), json!(provider.unresolved().len()));
        metrics.insert("counts_by_type".into(), json!(counts_by_type));
        metrics.insert("total_story_points".into(), json!(total_story_points));
        metrics.insert("epic_breakdown".into(), epic_breakdown);
        metrics.insert("stories_per_epic".into(), json!(stories_per_epic));
        metrics.insert("average_stories_per_epic".into(), json!(round2(average_stories)));
        metrics.insert("project_count".into(), json!(distribution.len()));
        metrics.insert("projects".into(), Value::Array(projects));
        metrics.insert(
            "top_project".into(),
            json!(distribution.first().map(|(name, _)| name)),
        );
        metrics.insert("concentration_index".into(), json!(round2(concentration_index)));
        Ok(metrics)
    }
}

#[cfg(test)]
#[path = "scope_tests.rs"]
mod tests;
