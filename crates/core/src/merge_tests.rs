// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::analyzer::Metrics;
use crate::clock::FixedClock;
use chrono::{Duration, TimeZone};
use serde_json::json;
use std::sync::Arc;

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
}

fn scope_metrics() -> Metrics {
    let mut metrics = Metrics::new();
    metrics.insert("total_issues".into(), json!(3));
    metrics.insert("projects".into(), json!([]));
    metrics.insert("concentration_index".into(), json!(0.0));
    metrics
}

fn parts() -> CompositeParts {
    let mut results = BTreeMap::new();
    results.insert(
        AnalyzerKind::Scope,
        AnalyzerResult::success(AnalyzerKind::Scope, scope_metrics()),
    );
    results.insert(
        AnalyzerKind::Status,
        AnalyzerResult::failed(AnalyzerKind::Status, "bad history"),
    );
    CompositeParts {
        epic_id: "EPIC-1".into(),
        source_timestamps: [("EPIC-1".to_string(), at(8)), ("STORY-1".to_string(), at(9))].into(),
        results,
        qualitative_summary: Some("On track.".into()),
        artifacts: BTreeMap::new(),
    }
}

fn prior(document: &str) -> StoredComposite {
    StoredComposite {
        epic_id: "EPIC-1".into(),
        generated_at: at(7),
        document: document.into(),
    }
}

#[test]
fn fresh_merge_assembles_composite() {
    let merger = SummaryMerger::new(Arc::new(FixedClock::new(at(12))));

    let outcome = merger.merge(parts(), CacheDecision::Recompute, None).unwrap();

    let MergeOutcome::Fresh { composite, document } = outcome else {
        unreachable!("expected a fresh composite");
    };
    assert_eq!(composite.generated_at, at(12));
    assert_eq!(composite.data_as_of, Some(at(9)));
    assert!(composite.results[&AnalyzerKind::Status].is_failure());
    let parsed: CompositeSummary = serde_json::from_str(&document).unwrap();
    assert_eq!(parsed, *composite);
}

#[test]
fn merge_is_deterministic_apart_from_generation_time() {
    let clock = Arc::new(FixedClock::new(at(12)));
    let merger = SummaryMerger::new(clock.clone());

    let first = merger.merge(parts(), CacheDecision::Recompute, None).unwrap();
    let second = merger.merge(parts(), CacheDecision::Recompute, None).unwrap();
    assert_eq!(first.document(), second.document());

    clock.advance(Duration::hours(1));
    let third = merger.merge(parts(), CacheDecision::Recompute, None).unwrap();
    assert_ne!(first.document(), third.document());
    let strip = |doc: &str| {
        let mut value: serde_json::Value = serde_json::from_str(doc).unwrap();
        value.as_object_mut().unwrap().remove("generated_at");
        value
    };
    assert_eq!(strip(first.document()), strip(third.document()));
}

#[test]
fn reuse_returns_stored_document_verbatim() {
    let merger = SummaryMerger::new(Arc::new(FixedClock::new(at(12))));
    let stored = prior("{\n  \"epic_id\": \"EPIC-1\"  }");

    let outcome = merger
        .merge(parts(), CacheDecision::Reuse, Some(&stored))
        .unwrap();

    assert!(outcome.is_reused());
    assert_eq!(outcome.document(), stored.document);
}

#[test]
fn reuse_without_prior_recomputes() {
    let merger = SummaryMerger::new(Arc::new(FixedClock::new(at(12))));

    let outcome = merger.merge(parts(), CacheDecision::Reuse, None).unwrap();

    assert!(!outcome.is_reused());
}

#[test]
fn missing_required_metric_is_inconsistent() {
    let merger = SummaryMerger::new(Arc::new(FixedClock::new(at(12))));
    let mut broken = parts();
    let mut metrics = scope_metrics();
    metrics.remove("projects");
    broken.results.insert(
        AnalyzerKind::Scope,
        AnalyzerResult::success(AnalyzerKind::Scope, metrics),
    );

    let err = merger
        .merge(broken, CacheDecision::Recompute, None)
        .unwrap_err();

    match err {
        Error::MergeInconsistency { kind, reason } => {
            assert_eq!(kind, "scope");
            assert!(reason.contains("projects"));
        }
        other => unreachable!("unexpected error: {other}"),
    }
}

#[test]
fn result_under_wrong_kind_is_inconsistent() {
    let merger = SummaryMerger::new(Arc::new(FixedClock::new(at(12))));
    let mut broken = parts();
    broken.results.insert(
        AnalyzerKind::Backlog,
        AnalyzerResult::success(AnalyzerKind::Scope, scope_metrics()),
    );

    let err = merger
        .merge(broken, CacheDecision::Recompute, None)
        .unwrap_err();

    assert!(matches!(err, Error::MergeInconsistency { .. }));
}

#[test]
fn artifacts_are_recorded_verbatim() {
    let merger = SummaryMerger::new(Arc::new(FixedClock::new(at(12))));
    let artifacts: BTreeMap<String, String> =
        [("burnup".to_string(), "out/../burnup.png".to_string())].into();

    let outcome = merger
        .merge(parts().with_artifacts(artifacts), CacheDecision::Recompute, None)
        .unwrap();

    let value: serde_json::Value = serde_json::from_str(outcome.document()).unwrap();
    assert_eq!(value["artifacts"]["burnup"], "out/../burnup.png");
    assert_eq!(value["results"]["scope"]["kind"], "scope");
}
