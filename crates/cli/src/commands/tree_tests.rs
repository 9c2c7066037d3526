// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::commands::testing::TestContext;
use crate::error::Error;
use serde_json::{json, Value};

#[test]
fn text_tree_lists_children() {
    let mut ctx = TestContext::new();
    ctx.sample_epic();

    let lines = run_impl(&ctx.db, "EPIC-1", OutputFormat::Text, false).unwrap();

    assert_eq!(
        lines,
        vec![
            "EPIC-1: Checkout [epic, in_progress]",
            "├── STORY-1: Cart [story, done]",
            "└── STORY-2: Pay [story, open]",
        ]
    );
}

#[test]
fn json_tree_lists_nodes_breadth_first() {
    let mut ctx = TestContext::new();
    ctx.sample_epic().record(json!({
        "key": "STORY-2",
        "issue_type": "Story",
        "title": "Pay",
        "status": "Open",
        "children": [{ "key": "TASK-404" }],
        "retrieved_at": "2024-06-01T13:00:00Z",
    }));

    let lines = run_impl(&ctx.db, "EPIC-1", OutputFormat::Json, false).unwrap();
    let nodes: Vec<Value> = serde_json::from_str(&lines[0]).unwrap();

    let keys: Vec<&str> = nodes.iter().map(|n| n["key"].as_str().unwrap()).collect();
    assert_eq!(keys, vec!["EPIC-1", "STORY-1", "STORY-2", "TASK-404"]);
    assert_eq!(nodes[3]["record"], Value::Null);
    assert_eq!(nodes[3]["parent"], "STORY-2");
    assert_eq!(nodes[3]["depth"], 2);
}

#[test]
fn unknown_epic_is_not_found() {
    let ctx = TestContext::new();
    let err = run_impl(&ctx.db, "EPIC-404", OutputFormat::Text, false).unwrap_err();
    assert!(matches!(
        err,
        Error::Core(epicscope_core::Error::IssueNotFound(ref key)) if key == "EPIC-404"
    ));
}
