// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::issue::{IssueRecord, IssueType, Status};
use crate::tree::Tree;
use chrono::{TimeZone, Utc};

fn tree() -> Tree {
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let mut business = IssueRecord::new("BE-1", IssueType::BusinessEpic, "Checkout", Status::Analysis, at)
        .with_realized_by("PAY-1");
    business.description = Some("Faster checkout".to_string());
    let mut epic = IssueRecord::new("PAY-1", IssueType::Epic, "Payments", Status::InProgress, at)
        .with_child("PAY-2");
    epic.assignee = Some("kim".to_string());
    epic.target_end = Some("2024-09-30".to_string());
    epic.fix_versions = vec!["PI28".to_string()];
    epic.description = Some(String::new());

    let records: HashMap<String, IssueRecord> = [
        business,
        epic,
        IssueRecord::new("PAY-2", IssueType::Story, "Card form", Status::Open, at),
    ]
    .into_iter()
    .map(|r| (r.key.clone(), r))
    .collect();
    Tree::build("BE-1", &records).unwrap()
}

#[test]
fn context_lists_issues_breadth_first() {
    let tree = tree();
    let context = build_context(&DataProvider::new(&tree));

    assert_eq!(context["root"], "BE-1");
    let keys: Vec<&str> = context["issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["BE-1", "PAY-1", "PAY-2"]);
}

#[test]
fn context_carries_optional_fields_and_links() {
    let tree = tree();
    let context = build_context(&DataProvider::new(&tree));
    let issues = context["issues"].as_array().unwrap();

    assert_eq!(issues[0]["description"], "Faster checkout");
    assert_eq!(issues[0]["realized_by"], json!(["PAY-1"]));
    assert_eq!(issues[1]["realizes"], "BE-1");
    assert_eq!(issues[1]["assignee"], "kim");
    assert_eq!(issues[1]["fix_versions"], json!(["PI28"]));
    assert_eq!(issues[1]["type"], "epic");
    assert!(issues[1].get("description").is_none());
    assert!(issues[2].get("realizes").is_none());
    assert!(issues[2].get("assignee").is_none());
}
