// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Context document for the qualitative summary.

use serde_json::{json, Value};
use std::collections::HashMap;

use crate::provider::DataProvider;

/// Builds the `{ root, issues }` document handed to the text generator.
///
/// Issues appear in breadth-first order. Optional fields are omitted when
/// empty; `realizes` names the issue that declared this one as realized-by.
pub fn build_context(provider: &DataProvider<'_>) -> Value {
    let mut realizes: HashMap<&str, &str> = HashMap::new();
    for record in provider.issues() {
        for target in &record.realized_by {
            realizes.entry(target.key.as_str()).or_insert(record.key.as_str());
        }
    }

    let issues: Vec<Value> = provider
        .issues()
        .map(|record| {
            let mut entry = serde_json::Map::new();
            entry.insert("key".into(), json!(record.key));
            entry.insert("title".into(), json!(record.title));
            entry.insert("type".into(), json!(record.issue_type));
            entry.insert("status".into(), json!(record.status));
            if let Some(assignee) = &record.assignee {
                entry.insert("assignee".into(), json!(assignee));
            }
            if let Some(start) = &record.target_start {
                entry.insert("target_start".into(), json!(start));
            }
            if let Some(end) = &record.target_end {
                entry.insert("target_end".into(), json!(end));
            }
            if !record.fix_versions.is_empty() {
                entry.insert("fix_versions".into(), json!(record.fix_versions));
            }
            if let Some(description) = record.description.as_deref().filter(|d| !d.is_empty()) {
                entry.insert("description".into(), json!(description));
            }
            if !record.realized_by.is_empty() {
                let keys: Vec<&str> = record.realized_by.iter().map(|r| r.key.as_str()).collect();
                entry.insert("realized_by".into(), json!(keys));
            }
            if let Some(parent) = realizes.get(record.key.as_str()) {
                entry.insert("realizes".into(), json!(parent));
            }
            Value::Object(entry)
        })
        .collect();

    json!({
        "root": provider.epic_id(),
        "issues": issues,
    })
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
