// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::error::Error;
use crate::issue::Status;
use crate::text::{TextGenerator, Unavailable};
use crate::tree::Tree;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use yare::parameterized;

fn at(month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, month, day, hour, 0, 0).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn target(when: DateTime<Utc>, old: Option<&str>, new: Option<&str>) -> Activity {
    Activity::new(ChangeField::TargetEnd, when).with_values(old, new)
}

fn fix_version(when: DateTime<Utc>, old: Option<&str>, new: Option<&str>) -> Activity {
    Activity::new(ChangeField::FixVersion, when).with_values(old, new)
}

fn epic(activities: Vec<Activity>) -> IssueRecord {
    let mut record = IssueRecord::new("EPIC-1", IssueType::Epic, "Epic", Status::InProgress, at(9, 1, 0))
        .with_created_at(at(5, 1, 8));
    for activity in activities {
        record = record.with_activity(activity);
    }
    record
}

fn analyzer() -> TimeCreepAnalyzer {
    TimeCreepAnalyzer::new(CreepConfig::default(), Arc::new(Unavailable))
}

fn changes(events: &[ScheduleEvent]) -> Vec<(ScheduleChange, i64)> {
    events.iter().map(|e| (e.change, e.days_shifted)).collect()
}

struct Recording {
    seen: Mutex<Vec<String>>,
}

impl TextGenerator for Recording {
    fn summarize(&self, context: &str) -> crate::error::Result<String> {
        self.seen.lock().unwrap().push(context.to_string());
        Ok("Delivery moved out by six weeks.".to_string())
    }
}

#[test]
fn target_end_revision_is_a_slip() {
    let record = epic(vec![
        target(at(5, 10, 9), None, Some("2024-06-01")),
        target(at(6, 20, 9), Some("2024-06-01"), Some("2024-07-15")),
    ]);

    let events = analyzer().issue_events(&record);

    assert_eq!(
        changes(&events),
        vec![(ScheduleChange::Set, 0), (ScheduleChange::Creep, 44)]
    );
    assert_eq!(events[1].from.as_deref(), Some("2024-06-01"));
    assert_eq!(events[1].to_date, date(2024, 7, 15));
}

#[test]
fn earlier_date_is_a_pull_in() {
    let record = epic(vec![
        target(at(5, 10, 9), None, Some("2024-06-20")),
        target(at(5, 12, 9), Some("2024-06-20"), Some("2024-06-10")),
    ]);

    let events = analyzer().issue_events(&record);

    assert_eq!(
        changes(&events),
        vec![(ScheduleChange::Set, 0), (ScheduleChange::PullIn, -10)]
    );
}

#[test]
fn same_day_changes_collapse_to_the_last() {
    let record = epic(vec![
        target(at(5, 10, 9), None, Some("2024-06-01")),
        target(at(5, 10, 15), Some("2024-06-01"), Some("2024-06-20")),
        target(at(5, 12, 9), Some("2024-06-20"), Some("2024-06-10")),
    ]);

    let events = analyzer().issue_events(&record);

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].to_date, date(2024, 6, 20));
    assert_eq!(events[1].change, ScheduleChange::PullIn);
}

#[test]
fn clearing_a_date_keeps_the_known_state() {
    let record = epic(vec![
        target(at(5, 10, 9), None, Some("2024-06-01")),
        target(at(5, 20, 9), Some("2024-06-01"), None),
        target(at(5, 25, 9), None, Some("2024-06-10")),
    ]);

    let events = analyzer().issue_events(&record);

    assert_eq!(
        changes(&events),
        vec![(ScheduleChange::Set, 0), (ScheduleChange::Creep, 9)]
    );
}

#[test]
fn creation_day_changes_are_first_commitments() {
    let record = epic(vec![
        target(at(5, 1, 9), Some("2024-05-30"), Some("2024-06-01")),
        target(at(5, 1, 11), Some("2024-06-01"), Some("2024-06-15")),
    ]);

    let events = analyzer().issue_events(&record);

    assert_eq!(changes(&events), vec![(ScheduleChange::Set, 0)]);
    assert_eq!(events[0].from, None);
    assert_eq!(events[0].to, "2024-06-15");
}

#[test]
fn fix_version_covering_target_end_is_silent() {
    let record = epic(vec![
        target(at(5, 10, 9), None, Some("2024-08-15")),
        fix_version(at(5, 11, 9), None, Some("Q3_24")),
        fix_version(at(6, 1, 9), Some("Q3_24"), Some("Q4_24")),
    ]);

    let events = analyzer().issue_events(&record);

    assert_eq!(
        changes(&events),
        vec![(ScheduleChange::Set, 0), (ScheduleChange::Creep, 92)]
    );
    assert_eq!(events[1].field, "Fix Version/s");
    assert_eq!(events[1].from.as_deref(), Some("Q3_24"));
    assert_eq!(events[1].to, "Q4_24");
}

#[test]
fn target_end_is_applied_before_fix_version_on_the_same_day() {
    let record = epic(vec![
        fix_version(at(5, 10, 8), None, Some("Q3_24")),
        target(at(5, 10, 9), None, Some("2024-08-15")),
    ]);

    let events = analyzer().issue_events(&record);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].field, "Target end");
}

#[test]
fn change_log_dates_are_understood() {
    let record = epic(vec![
        target(at(5, 10, 9), None, Some("New:01/Jun/2024")),
        target(at(6, 20, 9), Some("Old:01/Jun/2024"), Some("New:15/Jul/2024")),
    ]);

    let events = analyzer().issue_events(&record);

    assert_eq!(events[1].days_shifted, 44);
}

#[test]
fn stories_are_not_tracked() {
    let mut records = HashMap::new();
    records.insert(
        "EPIC-1".to_string(),
        epic(Vec::new()).with_child("STORY-1"),
    );
    records.insert(
        "STORY-1".to_string(),
        IssueRecord::new("STORY-1", IssueType::Story, "s", Status::Open, at(9, 1, 0))
            .with_activity(target(at(5, 10, 9), None, Some("2024-06-01")))
            .with_activity(target(at(6, 10, 9), Some("2024-06-01"), Some("2024-07-01"))),
    );
    let tree = Tree::build("EPIC-1", &records).unwrap();

    let metrics = analyzer().analyze(&DataProvider::new(&tree)).unwrap();

    assert_eq!(metrics["events"], serde_json::json!([]));
    assert_eq!(metrics["total_slip_days"], 0);
    assert!(metrics["narrative"].is_null());
}

#[parameterized(
    anchor = { "PI27", Some((date(2025, 1, 1), date(2025, 3, 31))) },
    before_anchor = { "PI26", Some((date(2024, 10, 1), date(2024, 12, 31))) },
    next_year = { "Release PI31 train", Some((date(2026, 1, 1), date(2026, 3, 31))) },
    third_quarter = { "PI29", Some((date(2025, 7, 1), date(2025, 9, 30))) },
    quarter_label = { "Q2_25", Some((date(2025, 4, 1), date(2025, 6, 30))) },
    bad_quarter = { "Q7_25", None },
    free_text = { "Backlog", None },
)]
fn fix_version_ranges(raw: &str, expected: Option<(NaiveDate, NaiveDate)>) {
    assert_eq!(CreepConfig::default().fix_version_range(raw), expected);
}

#[test]
fn pi_anchor_is_configurable() {
    let config = CreepConfig {
        pi_base_number: 10,
        pi_base_year: 2020,
        ..CreepConfig::default()
    };
    assert_eq!(
        config.fix_version_range("PI11"),
        Some((date(2020, 4, 1), date(2020, 6, 30)))
    );
}

#[parameterized(
    pi = { "2025 PI28 (Planned)", "PI28" },
    quarter = { "Q1_25 Release", "Q1_25" },
    other = { " Someday ", "Someday" },
)]
fn fix_version_labels(raw: &str, expected: &str) {
    assert_eq!(normalize_fix_version(raw), expected);
}

#[parameterized(
    iso = { "2024-07-15", Some(date(2024, 7, 15)) },
    rfc3339 = { "2024-07-15T22:30:00Z", Some(date(2024, 7, 15)) },
    naive_datetime = { "2024-07-15T08:00:00", Some(date(2024, 7, 15)) },
    change_log = { "New:15/Jul/2024", Some(date(2024, 7, 15)) },
    empty = { "  ", None },
    garbage = { "soon", None },
)]
fn date_formats(raw: &str, expected: Option<NaiveDate>) {
    assert_eq!(parse_date(raw), expected);
}

#[test]
fn narrative_summarizes_slips() {
    let record = epic(vec![
        target(at(5, 10, 9), None, Some("2024-06-01")),
        target(at(6, 20, 9), Some("2024-06-01"), Some("2024-07-15")),
    ]);
    let records: HashMap<String, IssueRecord> = [("EPIC-1".to_string(), record)].into();
    let tree = Tree::build("EPIC-1", &records).unwrap();
    let text = Arc::new(Recording {
        seen: Mutex::new(Vec::new()),
    });

    let metrics = TimeCreepAnalyzer::new(CreepConfig::default(), text.clone())
        .analyze(&DataProvider::new(&tree))
        .unwrap();

    assert_eq!(metrics["narrative"], "Delivery moved out by six weeks.");
    assert_eq!(metrics["total_slip_days"], 44);
    assert_eq!(metrics["slipped_issues"], serde_json::json!(["EPIC-1"]));
    assert_eq!(metrics["dates_set"], 1);
    assert_eq!(metrics["slip_events"][0]["direction"], "later");
    let seen = text.seen.lock().unwrap();
    assert!(seen[0].contains("moved later by 44 days"));
}

#[test]
fn narrative_failure_keeps_the_metrics() {
    let record = epic(vec![
        target(at(5, 10, 9), None, Some("2024-06-01")),
        target(at(6, 20, 9), Some("2024-06-01"), Some("2024-07-15")),
    ]);
    let records: HashMap<String, IssueRecord> = [("EPIC-1".to_string(), record)].into();
    let tree = Tree::build("EPIC-1", &records).unwrap();

    let metrics = analyzer().analyze(&DataProvider::new(&tree)).unwrap();

    assert!(metrics["narrative"].is_null());
    assert!(metrics["narrative_error"].is_string());
    assert_eq!(metrics["events"][1]["change"], "creep");
    for key in AnalyzerKind::TimeCreep.required_keys() {
        assert!(metrics.contains_key(*key), "missing {key}");
    }
}

#[test]
fn unavailable_generator_reports_text_generation() {
    assert!(matches!(
        Unavailable.summarize("x"),
        Err(Error::TextGeneration(_))
    ));
}
