// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::analyzer::{Analyzer, AnalyzerKind, Metrics};
use crate::clock::FixedClock;
use crate::issue::{Activity, ChangeField, IssueRecord, IssueType, Status};
use crate::text::{TextGenerator, Unavailable};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() + Duration::days(n)
}

fn transition(at: DateTime<Utc>, from: &str, to: &str) -> Activity {
    Activity::new(ChangeField::Status, at).with_values(Some(from), Some(to))
}

fn scenario_records() -> Vec<IssueRecord> {
    vec![
        IssueRecord::new("EPIC-1", IssueType::Epic, "Epic", Status::InProgress, day(10))
            .with_created_at(day(0))
            .with_child("STORY-1")
            .with_child("STORY-2"),
        IssueRecord::new("STORY-1", IssueType::Story, "One", Status::Done, day(10))
            .with_created_at(day(0))
            .with_activity(transition(day(1), "Open", "In Progress"))
            .with_activity(transition(day(5), "In Progress", "Done")),
        IssueRecord::new("STORY-2", IssueType::Story, "Two", Status::InProgress, day(10))
            .with_created_at(day(0))
            .with_activity(transition(day(3), "Open", "In Progress")),
    ]
}

fn seeded_db() -> Database {
    let db = Database::open_in_memory().unwrap();
    for record in scenario_records() {
        db.store_record(&record).unwrap();
    }
    db
}

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(day(10)))
}

struct Canned;

impl TextGenerator for Canned {
    fn summarize(&self, context: &str) -> Result<String> {
        assert!(context.contains("STORY-2"));
        Ok("Two stories, one done.".to_string())
    }
}

struct Counting {
    calls: Arc<AtomicUsize>,
    metrics: Metrics,
}

impl Analyzer for Counting {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Scope
    }

    fn analyze(&self, _provider: &DataProvider<'_>) -> Result<Metrics> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.metrics.clone())
    }
}

fn counting(calls: &Arc<AtomicUsize>, metrics: Metrics) -> AnalyzerRegistry {
    AnalyzerRegistry::new().with(Box::new(Counting {
        calls: calls.clone(),
        metrics,
    }))
}

fn scope_metrics() -> Metrics {
    let mut metrics = Metrics::new();
    metrics.insert("total_issues".into(), serde_json::json!(3));
    metrics.insert("projects".into(), serde_json::json!([]));
    metrics.insert("concentration_index".into(), serde_json::json!(0.0));
    metrics
}

#[test]
fn end_to_end_scenario() {
    let db = seeded_db();
    let mut pipeline = Pipeline::new(&db, &Config::default(), clock(), Arc::new(Canned));

    let report = pipeline
        .run("EPIC-1", StalenessDirective::Check, &CancelToken::new())
        .unwrap();

    assert!(!report.reused);
    assert!(report.population.is_none());
    let results = &report.composite.results;
    assert_eq!(results.len(), 4);
    let status = &results[&AnalyzerKind::Status].metrics;
    assert_eq!(status["issues"]["STORY-1"]["coding_days"], 4.0);
    assert_eq!(status["issues"]["STORY-2"]["coding_days"], 7.0);
    let series = results[&AnalyzerKind::Backlog].metrics["series"].as_array().unwrap();
    assert_eq!(series[0]["added"], 2);
    assert_eq!(series[5]["completed"], 1);
    assert_eq!(
        report.composite.qualitative_summary.as_deref(),
        Some("Two stories, one done.")
    );
    assert_eq!(report.composite.data_as_of, Some(day(10)));
    assert_eq!(db.composite_count("EPIC-1").unwrap(), 1);
    assert_eq!(
        db.latest_composite("EPIC-1").unwrap().unwrap().document,
        report.document
    );
}

#[test]
fn fresh_composite_is_reused_byte_for_byte() {
    let db = seeded_db();
    let calls = Arc::new(AtomicUsize::new(0));
    let first = Pipeline::new(&db, &Config::default(), clock(), Arc::new(Unavailable))
        .with_registry(counting(&calls, scope_metrics()))
        .run("EPIC-1", StalenessDirective::Force, &CancelToken::new())
        .unwrap();

    let second = Pipeline::new(&db, &Config::default(), clock(), Arc::new(Unavailable))
        .with_registry(counting(&calls, scope_metrics()))
        .run("EPIC-1", StalenessDirective::Check, &CancelToken::new())
        .unwrap();

    assert!(second.reused);
    assert_eq!(second.document, first.document);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(db.composite_count("EPIC-1").unwrap(), 1);
}

#[test]
fn stale_composite_is_recomputed() {
    let db = seeded_db();
    let clock = clock();
    Pipeline::new(&db, &Config::default(), clock.clone(), Arc::new(Unavailable))
        .run("EPIC-1", StalenessDirective::Force, &CancelToken::new())
        .unwrap();

    clock.advance(Duration::days(8));
    let report = Pipeline::new(&db, &Config::default(), clock.clone(), Arc::new(Unavailable))
        .run("EPIC-1", StalenessDirective::Check, &CancelToken::new())
        .unwrap();

    assert!(!report.reused);
    assert_eq!(db.composite_count("EPIC-1").unwrap(), 2);
}

#[test]
fn forced_recompute_at_same_instant_adds_version() {
    let db = seeded_db();
    let clock = clock();
    let first = Pipeline::new(&db, &Config::default(), clock.clone(), Arc::new(Unavailable))
        .run("EPIC-1", StalenessDirective::Force, &CancelToken::new())
        .unwrap();
    let second = Pipeline::new(&db, &Config::default(), clock.clone(), Arc::new(Canned))
        .run("EPIC-1", StalenessDirective::Force, &CancelToken::new())
        .unwrap();

    assert_eq!(db.composite_count("EPIC-1").unwrap(), 2);
    assert_ne!(first.document, second.document);
    let latest = db.latest_composite("EPIC-1").unwrap().unwrap();
    assert_eq!(latest.document, second.document);
}

#[test]
fn skip_without_composite_fails_and_persists_nothing() {
    let db = seeded_db();

    let result = Pipeline::new(&db, &Config::default(), clock(), Arc::new(Unavailable)).run(
        "EPIC-1",
        StalenessDirective::Skip,
        &CancelToken::new(),
    );

    assert!(matches!(
        result,
        Err(Error::NoCachedArtifact {
            artifact: "composite",
            ..
        })
    ));
    assert_eq!(db.composite_count("EPIC-1").unwrap(), 0);
}

#[test]
fn cancelled_run_stores_nothing() {
    let db = seeded_db();
    let cancel = CancelToken::new();
    cancel.cancel();

    let result = Pipeline::new(&db, &Config::default(), clock(), Arc::new(Unavailable)).run(
        "EPIC-1",
        StalenessDirective::Force,
        &cancel,
    );

    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(db.composite_count("EPIC-1").unwrap(), 0);
}

#[test]
fn inconsistent_result_keeps_prior_composite() {
    let db = seeded_db();
    let calls = Arc::new(AtomicUsize::new(0));
    let first = Pipeline::new(&db, &Config::default(), clock(), Arc::new(Unavailable))
        .run("EPIC-1", StalenessDirective::Force, &CancelToken::new())
        .unwrap();

    let mut broken = scope_metrics();
    broken.remove("concentration_index");
    let result = Pipeline::new(&db, &Config::default(), clock(), Arc::new(Unavailable))
        .with_registry(counting(&calls, broken))
        .run("EPIC-1", StalenessDirective::Force, &CancelToken::new());

    assert!(matches!(result, Err(Error::MergeInconsistency { .. })));
    assert_eq!(db.composite_count("EPIC-1").unwrap(), 1);
    assert_eq!(
        db.latest_composite("EPIC-1").unwrap().unwrap().document,
        first.document
    );
}

#[test]
fn missing_root_is_not_found() {
    let db = Database::open_in_memory().unwrap();

    let result = Pipeline::new(&db, &Config::default(), clock(), Arc::new(Unavailable)).run(
        "EPIC-9",
        StalenessDirective::Force,
        &CancelToken::new(),
    );

    assert!(matches!(result, Err(Error::IssueNotFound(_))));
}

#[test]
fn attached_source_populates_before_analysis() {
    struct Source(HashMap<String, IssueRecord>);

    impl RecordSource for Source {
        fn fetch(&mut self, key: &str) -> Result<Option<IssueRecord>> {
            Ok(self.0.get(key).cloned())
        }
    }

    let db = Database::open_in_memory().unwrap();
    let mut source = Source(
        scenario_records()
            .into_iter()
            .map(|r| (r.key.clone(), r))
            .collect(),
    );
    let artifacts: BTreeMap<String, String> =
        [("tree".to_string(), "out/EPIC-1-tree.png".to_string())].into();

    let report = Pipeline::new(&db, &Config::default(), clock(), Arc::new(Unavailable))
        .with_source(&mut source)
        .with_artifacts(artifacts)
        .run("EPIC-1", StalenessDirective::Check, &CancelToken::new())
        .unwrap();

    let population = report.population.unwrap();
    assert_eq!(population.fetched.len(), 3);
    assert_eq!(report.composite.artifacts["tree"], "out/EPIC-1-tree.png");
    assert!(report.composite.qualitative_summary.is_none());
    assert_eq!(db.record_keys().unwrap().len(), 3);
}
