// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Status and duration analyzer.
//!
//! Each issue's history is replayed as a sequence of status intervals. The
//! status before the first transition runs from the issue's creation. The
//! final interval runs to "now" only while the issue is still active; a
//! terminal status accrues no time.

use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use super::{round2, Analyzer, AnalyzerKind, Metrics};
use crate::clock::{ClockSource, SharedClock};
use crate::config::StatusConfig;
use crate::error::Result;
use crate::issue::{Activity, ChangeField, IssueRecord, Status};
use crate::provider::DataProvider;

/// Fields whose changes count towards a contributor's activity.
const SIGNIFICANT_FIELDS: [ChangeField; 5] = [
    ChangeField::Status,
    ChangeField::Description,
    ChangeField::AcceptanceCriteria,
    ChangeField::Assignee,
    ChangeField::FixVersion,
];

/// Window for the recent-activity count.
const RECENT_DAYS: i64 = 28;

pub struct StatusAnalyzer {
    config: StatusConfig,
    clock: SharedClock,
}

/// A status held over a time range.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusInterval {
    pub status: Status,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl StatusInterval {
    fn days(&self) -> f64 {
        duration_days(self.end - self.start)
    }
}

fn duration_days(d: Duration) -> f64 {
    d.num_milliseconds() as f64 / 86_400_000.0
}

fn status_transitions(record: &IssueRecord) -> Vec<(&Activity, Status)> {
    record
        .sorted_activities()
        .into_iter()
        .filter_map(|a| a.new_status().map(|s| (a, s)))
        .collect()
}

/// Replays a record's status history into intervals ending at `now`.
pub fn status_intervals(record: &IssueRecord, now: DateTime<Utc>) -> Vec<StatusInterval> {
    let transitions = status_transitions(record);
    let Some(start) = record.created().or_else(|| transitions.first().map(|(a, _)| a.at)) else {
        return Vec::new();
    };

    let mut current = transitions
        .first()
        .and_then(|(a, _)| a.old_status())
        .unwrap_or(if transitions.is_empty() {
            record.status
        } else {
            Status::Open
        });
    let mut since = start;
    let mut intervals = Vec::new();
    for (activity, next) in transitions {
        if activity.at > since {
            intervals.push(StatusInterval {
                status: current,
                start: since,
                end: activity.at,
            });
        }
        current = next;
        since = since.max(activity.at);
    }
    if current.is_active() && now > since {
        intervals.push(StatusInterval {
            status: current,
            start: since,
            end: now,
        });
    }
    intervals
}

impl StatusAnalyzer {
    pub fn new(config: StatusConfig, clock: SharedClock) -> Self {
        StatusAnalyzer { config, clock }
    }

    fn is_coding(&self, status: Status) -> bool {
        self.config.coding_statuses.contains(&status)
    }

    fn time_in_status(intervals: &[StatusInterval]) -> BTreeMap<&'static str, f64> {
        let mut totals: BTreeMap<&'static str, f64> = BTreeMap::new();
        for interval in intervals {
            *totals.entry(interval.status.as_str()).or_default() += interval.days();
        }
        totals.values_mut().for_each(|v| *v = round2(*v));
        totals
    }

    fn first_coding_entry(&self, record: &IssueRecord) -> Option<DateTime<Utc>> {
        status_transitions(record)
            .into_iter()
            .find(|(_, s)| self.is_coding(*s))
            .map(|(a, _)| a.at)
    }

    fn activity_summary(&self, provider: &DataProvider<'_>, now: DateTime<Utc>) -> Value {
        let all = provider.all_activities();
        let mut by_field: BTreeMap<String, usize> = BTreeMap::new();
        let mut contributors: BTreeMap<&str, usize> = BTreeMap::new();
        let mut blocked_events = 0;
        for entry in &all {
            let activity = entry.activity;
            *by_field.entry(activity.field.to_string()).or_default() += 1;
            if activity.new_status() == Some(Status::Blocked) {
                blocked_events += 1;
            }
            if SIGNIFICANT_FIELDS.contains(&activity.field) {
                if let Some(author) = activity.author.as_deref() {
                    *contributors.entry(author).or_default() += 1;
                }
            }
        }
        let mut ranked: Vec<(&str, usize)> = contributors.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        let key_contributors: Vec<Value> = ranked
            .into_iter()
            .take(3)
            .map(|(name, count)| json!({"name": name, "contributions": count}))
            .collect();
        let recent = all
            .iter()
            .filter(|e| now - e.activity.at <= Duration::days(RECENT_DAYS))
            .count();

        json!({
            "total_activities": all.len(),
            "counts_by_field": by_field,
            "recent_activities": recent,
            "blocked_events": blocked_events,
            "key_contributors": key_contributors,
        })
    }
}

impl Analyzer for StatusAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Status
    }

    fn analyze(&self, provider: &DataProvider<'_>) -> Result<Metrics> {
        let now = self.clock.now();
        let root = provider.epic_id();

        let mut issues = serde_json::Map::new();
        let mut total_coding = 0.0;
        let mut coding_start: Option<DateTime<Utc>> = None;
        let mut coding_end: Option<DateTime<Utc>> = None;
        let mut all_coding_done = true;
        let mut any_coding = false;
        let mut epic_status_days = BTreeMap::new();

        for record in provider.issues() {
            let intervals = status_intervals(record, now);
            let coding: f64 = intervals
                .iter()
                .filter(|i| self.is_coding(i.status))
                .map(StatusInterval::days)
                .sum();
            let time_in_status = Self::time_in_status(&intervals);

            if record.key == root {
                epic_status_days = time_in_status.clone();
            } else {
                total_coding += coding;
                if let Some(entered) = self.first_coding_entry(record) {
                    any_coding = true;
                    coding_start = Some(coding_start.map_or(entered, |s| s.min(entered)));
                    match record.last_terminal_transition() {
                        Some(done) if record.status.is_terminal() => {
                            coding_end = Some(coding_end.map_or(done, |e| e.max(done)));
                        }
                        _ => all_coding_done = false,
                    }
                }
            }

            issues.insert(
                record.key.clone(),
                json!({
                    "type": record.issue_type,
                    "current_status": record.status,
                    "ongoing": record.status.is_active(),
                    "time_in_status_days": time_in_status,
                    "coding_days": round2(coding),
                }),
            );
        }

        let coding_end = coding_end.filter(|_| any_coding && all_coding_done);
        let coding_duration = match (coding_start, coding_end) {
            (Some(start), Some(end)) => Some(round2(duration_days(end - start))),
            _ => None,
        };

        let status_changes: Vec<Value> = provider
            .all_activities()
            .into_iter()
            .filter(|e| e.activity.field == ChangeField::Status)
            .map(|e| {
                let describe = |parsed: Option<Status>, raw: &Option<String>| match parsed {
                    Some(s) => json!(s),
                    None => json!(raw),
                };
                json!({
                    "timestamp": e.activity.at,
                    "issue": e.key,
                    "from": describe(e.activity.old_status(), &e.activity.old_value),
                    "to": describe(e.activity.new_status(), &e.activity.new_value),
                })
            })
            .collect();

        let mut metrics = Metrics::new();
        metrics.insert("issues".into(), Value::Object(issues));
        metrics.insert("total_coding_days".into(), json!(round2(total_coding)));
        metrics.insert("coding_start".into(), json!(coding_start));
        metrics.insert("coding_end".into(), json!(coding_end));
        metrics.insert("coding_duration_days".into(), json!(coding_duration));
        metrics.insert("epic_status_days".into(), json!(epic_status_days));
        metrics.insert("status_changes".into(), Value::Array(status_changes));
        metrics.insert("activity".into(), self.activity_summary(provider, now));
        Ok(metrics)
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
