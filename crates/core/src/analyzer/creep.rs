// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Time-creep analyzer: detects revisions of committed dates.
//!
//! Changes to `Target end` and `Fix Version/s` are consolidated per issue,
//! per day and per field: only the last change of a day counts. Each field
//! keeps a known state (label and date range):
//! - on the issue's creation day the prior state is treated as unknown;
//! - clearing a field emits nothing and keeps the last known state;
//! - a fix version whose quarter contains the known target end emits nothing.
//!
//! Fix versions name quarters, either `Qn_yy` or a program increment `PIxx`
//! counted in quarters from a configured anchor.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::{debug, warn};

use super::{Analyzer, AnalyzerKind, Metrics};
use crate::config::CreepConfig;
use crate::error::Result;
use crate::issue::{Activity, ChangeField, IssueRecord, IssueType};
use crate::provider::DataProvider;
use crate::text::SharedTextGenerator;

static PI_RE: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"PI(\d+)") {
    Ok(re) => re,
    Err(_) => unreachable!("static regex pattern"),
});
static QUARTER_RE: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"Q(\d)_(\d{2})") {
    Ok(re) => re,
    Err(_) => unreachable!("static regex pattern"),
});

/// Classification of a schedule change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleChange {
    /// First commitment.
    Set,
    /// Moved later.
    Creep,
    /// Moved earlier.
    PullIn,
}

/// One consolidated schedule event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleEvent {
    pub issue: String,
    pub issue_type: IssueType,
    pub field: String,
    pub day: NaiveDate,
    pub change: ScheduleChange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_date: Option<NaiveDate>,
    pub to_date: NaiveDate,
    /// Signed shift of the end date; zero for a first commitment.
    pub days_shifted: i64,
}

impl ScheduleEvent {
    pub fn is_slip(&self) -> bool {
        self.change != ScheduleChange::Set
    }

    fn direction(&self) -> &'static str {
        match self.change {
            ScheduleChange::Set => "set",
            ScheduleChange::Creep => "later",
            ScheduleChange::PullIn => "earlier",
        }
    }
}

/// Known value of one schedule field.
#[derive(Debug, Clone)]
struct KnownState {
    label: String,
    range: (NaiveDate, NaiveDate),
}

/// Parses a date in ISO form, RFC 3339, or the change-log form `New:15/Jul/2024`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|d| d.date())
        })
        .or_else(|| {
            raw.rsplit(':')
                .next()
                .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%d/%b/%Y").ok())
        })
}

/// Extracts the canonical `PIxx` or `Qn_yy` part of a fix version name.
pub fn normalize_fix_version(raw: &str) -> String {
    PI_RE
        .find(raw)
        .or_else(|| QUARTER_RE.find(raw))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| raw.trim().to_string())
}

fn quarter_range(year: i32, quarter: u32) -> Option<(NaiveDate, NaiveDate)> {
    if !(1..=4).contains(&quarter) {
        return None;
    }
    let start = NaiveDate::from_ymd_opt(year, (quarter - 1) * 3 + 1, 1)?;
    let next = if quarter == 4 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, quarter * 3 + 1, 1)?
    };
    Some((start, next - Duration::days(1)))
}

impl CreepConfig {
    /// Date range covered by a fix version, if it names a quarter.
    pub fn fix_version_range(&self, raw: &str) -> Option<(NaiveDate, NaiveDate)> {
        if let Some(caps) = PI_RE.captures(raw) {
            let number: i64 = caps.get(1)?.as_str().parse().ok()?;
            let offset = number - i64::from(self.pi_base_number);
            let year = i64::from(self.pi_base_year) + offset.div_euclid(4);
            let quarter = offset.rem_euclid(4) as u32 + 1;
            return quarter_range(i32::try_from(year).ok()?, quarter);
        }
        let caps = QUARTER_RE.captures(raw)?;
        let quarter: u32 = caps.get(1)?.as_str().parse().ok()?;
        let year: i32 = caps.get(2)?.as_str().parse().ok()?;
        quarter_range(2000 + year, quarter)
    }
}

pub struct TimeCreepAnalyzer {
    config: CreepConfig,
    text: SharedTextGenerator,
}

impl TimeCreepAnalyzer {
    pub fn new(config: CreepConfig, text: SharedTextGenerator) -> Self {
        TimeCreepAnalyzer { config, text }
    }

    fn parse_field(&self, field: &ChangeField, raw: Option<&str>) -> Option<KnownState> {
        let raw = raw?;
        let (label, range) = match field {
            ChangeField::TargetEnd => {
                let date = parse_date(raw);
                if date.is_none() && !raw.trim().is_empty() {
                    warn!(value = raw, "unparseable target end");
                }
                let date = date?;
                (date.to_string(), (date, date))
            }
            _ => (normalize_fix_version(raw), self.config.fix_version_range(raw)?),
        };
        Some(KnownState { label, range })
    }

    /// Replays one issue's schedule history into consolidated events.
    pub fn issue_events(&self, record: &IssueRecord) -> Vec<ScheduleEvent> {
        let relevant: Vec<&Activity> = record
            .sorted_activities()
            .into_iter()
            .filter(|a| a.field.is_schedule())
            .collect();
        if relevant.is_empty() {
            return Vec::new();
        }
        let creation_day = record.created().map(|c| c.date_naive());

        let mut by_day: BTreeMap<NaiveDate, Vec<&Activity>> = BTreeMap::new();
        for activity in relevant {
            by_day.entry(activity.at.date_naive()).or_default().push(activity);
        }

        let mut target_end: Option<KnownState> = None;
        let mut fix_version: Option<KnownState> = None;
        let mut events = Vec::new();
        for (day, activities) in by_day {
            for field in [ChangeField::TargetEnd, ChangeField::FixVersion] {
                let Some(last) = activities.iter().rev().find(|a| a.field == field) else {
                    continue;
                };
                let new_state = self.parse_field(&field, last.new_value.as_deref());
                let known = if field == ChangeField::TargetEnd {
                    &target_end
                } else {
                    &fix_version
                };
                let start_of_day = if Some(day) == creation_day {
                    None
                } else {
                    known.clone()
                };

                let covered_by_target = field == ChangeField::FixVersion
                    && match (&new_state, &target_end) {
                        (Some(new), Some(target)) => {
                            new.range.0 <= target.range.1 && target.range.1 <= new.range.1
                        }
                        _ => false,
                    };
                if !covered_by_target {
                    let old = start_of_day.as_ref();
                    if let Some(event) = Self::classify(record, &field, day, old, new_state.as_ref()) {
                        events.push(event);
                    }
                }

                if let Some(state) = new_state {
                    if field == ChangeField::TargetEnd {
                        target_end = Some(state);
                    } else {
                        fix_version = Some(state);
                    }
                }
            }
        }
        events
    }

    fn classify(
        record: &IssueRecord,
        field: &ChangeField,
        day: NaiveDate,
        old: Option<&KnownState>,
        new: Option<&KnownState>,
    ) -> Option<ScheduleEvent> {
        let new = new?;
        let new_end = new.range.1;
        let (change, days_shifted) = match old {
            None => (ScheduleChange::Set, 0),
            Some(old) if new_end > old.range.1 => {
                (ScheduleChange::Creep, (new_end - old.range.1).num_days())
            }
            Some(old) if new_end < old.range.1 => {
                (ScheduleChange::PullIn, (new_end - old.range.1).num_days())
            }
            Some(_) => return None,
        };
        Some(ScheduleEvent {
            issue: record.key.clone(),
            issue_type: record.issue_type,
            field: field.to_string(),
            day,
            change,
            from: old.map(|o| o.label.clone()),
            to: new.label.clone(),
            from_date: old.map(|o| o.range.1),
            to_date: new_end,
            days_shifted,
        })
    }

    fn narrative_context(epic_id: &str, slips: &[&ScheduleEvent]) -> String {
        let mut lines = vec![format!(
            "Schedule revisions for {epic_id} ({} total):",
            slips.len()
        )];
        for slip in slips {
            lines.push(format!(
                "- {} {}: '{}' moved {} by {} days from {} to {} ({})",
                slip.day,
                slip.issue,
                slip.field,
                slip.direction(),
                slip.days_shifted.abs(),
                slip.from.as_deref().unwrap_or("none"),
                slip.to,
                slip.issue_type,
            ));
        }
        lines.join("\n")
    }
}

impl Analyzer for TimeCreepAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::TimeCreep
    }

    fn analyze(&self, provider: &DataProvider<'_>) -> Result<Metrics> {
        let mut events: Vec<ScheduleEvent> = provider
            .issues_of_type(&self.config.issue_types)
            .into_iter()
            .flat_map(|record| self.issue_events(record))
            .collect();
        events.sort_by(|a, b| a.day.cmp(&b.day).then(a.issue.cmp(&b.issue)));

        let slips: Vec<&ScheduleEvent> = events.iter().filter(|e| e.is_slip()).collect();
        let total_slip_days: i64 = slips.iter().map(|e| e.days_shifted).sum();
        let mut slipped_issues: Vec<&str> = slips.iter().map(|e| e.issue.as_str()).collect();
        slipped_issues.sort();
        slipped_issues.dedup();

        let slip_events: Vec<Value> = slips
            .iter()
            .map(|e| {
                json!({
                    "issue": e.issue,
                    "issue_type": e.issue_type,
                    "field": e.field,
                    "day": e.day,
                    "from": e.from,
                    "to": e.to,
                    "days_shifted": e.days_shifted,
                    "direction": e.direction(),
                })
            })
            .collect();

        let (narrative, narrative_error) = if slips.is_empty() {
            (None, None)
        } else {
            match self
                .text
                .summarize(&Self::narrative_context(provider.epic_id(), &slips))
            {
                Ok(text) => (Some(text), None),
                Err(e) => {
                    warn!(epic = provider.epic_id(), error = %e, "time-creep narrative unavailable");
                    (None, Some(e.to_string()))
                }
            }
        };
        debug!(events = events.len(), slips = slips.len(), "time creep analyzed");

        let mut metrics = Metrics::new();
        metrics.insert("events".into(), serde_json::to_value(&events)?);
        metrics.insert("slip_events".into(), Value::Array(slip_events));
        metrics.insert("total_slip_days".into(), json!(total_slip_days));
        metrics.insert("slipped_issues".into(), json!(slipped_issues));
        metrics.insert("dates_set".into(), json!(events.len() - slips.len()));
        metrics.insert("narrative".into(), json!(narrative));
        if let Some(error) = narrative_error {
            metrics.insert("narrative_error".into(), json!(error));
        }
        Ok(metrics)
    }
}

#[cfg(test)]
#[path = "creep_tests.rs"]
mod tests;
