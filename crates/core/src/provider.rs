// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only view of a built tree for analyzers.
//!
//! Analyzers only see records and activities through this facade, never the
//! arena itself. The provider is `Sync`, so one instance is shared by all
//! analyzers running in parallel.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::issue::{Activity, IssueRecord, IssueType};
use crate::tree::Tree;

/// An activity tagged with the issue it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IssueActivity<'a> {
    pub key: &'a str,
    pub activity: &'a Activity,
}

/// Facade over a [`Tree`] for analyzers.
#[derive(Debug, Clone, Copy)]
pub struct DataProvider<'t> {
    tree: &'t Tree,
}

impl<'t> DataProvider<'t> {
    pub fn new(tree: &'t Tree) -> Self {
        DataProvider { tree }
    }

    /// Key of the root epic.
    pub fn epic_id(&self) -> &'t str {
        self.tree.root()
    }

    /// The root epic's record.
    pub fn epic(&self) -> Option<&'t IssueRecord> {
        self.record(self.tree.root())
    }

    pub fn record(&self, key: &str) -> Option<&'t IssueRecord> {
        self.tree.get(key).and_then(|n| n.record.as_ref())
    }

    /// Resolved records in breadth-first order, root first.
    pub fn issues(&self) -> impl Iterator<Item = &'t IssueRecord> + 't {
        self.tree.bfs().filter_map(|n| n.record.as_ref())
    }

    /// Resolved records excluding the root epic.
    pub fn descendants(&self) -> impl Iterator<Item = &'t IssueRecord> + 't {
        let root = self.tree.root();
        self.issues().filter(move |r| r.key != root)
    }

    /// Resolved owned children of `key`.
    pub fn children(&self, key: &str) -> Vec<&'t IssueRecord> {
        self.tree
            .children(key)
            .into_iter()
            .filter_map(|n| n.record.as_ref())
            .collect()
    }

    /// Key of the owning parent of `key`.
    pub fn parent(&self, key: &str) -> Option<&'t str> {
        self.tree.get(key).and_then(|n| n.parent.as_deref())
    }

    /// Resolved records of any of the given types, in breadth-first order.
    pub fn issues_of_type(&self, types: &[IssueType]) -> Vec<&'t IssueRecord> {
        self.issues()
            .filter(|r| types.contains(&r.issue_type))
            .collect()
    }

    /// Activities of one issue, sorted by timestamp.
    pub fn activities(&self, key: &str) -> Vec<&'t Activity> {
        self.record(key)
            .map(|r| r.sorted_activities())
            .unwrap_or_default()
    }

    /// Every activity in the tree, sorted by timestamp then issue key.
    pub fn all_activities(&self) -> Vec<IssueActivity<'t>> {
        let mut all: Vec<IssueActivity<'t>> = self
            .issues()
            .flat_map(|r| {
                r.activities.iter().map(move |a| IssueActivity {
                    key: r.key.as_str(),
                    activity: a,
                })
            })
            .collect();
        all.sort_by(|a, b| a.activity.at.cmp(&b.activity.at).then(a.key.cmp(b.key)));
        all
    }

    /// Retrieval timestamp of every contributing record.
    pub fn source_timestamps(&self) -> BTreeMap<String, DateTime<Utc>> {
        self.issues()
            .map(|r| (r.key.clone(), r.retrieved_at))
            .collect()
    }

    /// Newest retrieval timestamp among contributing records.
    pub fn data_as_of(&self) -> Option<DateTime<Utc>> {
        self.issues().map(|r| r.retrieved_at).max()
    }

    /// Number of nodes, resolved or not.
    pub fn node_count(&self) -> usize {
        self.tree.len()
    }

    /// Keys of unresolved placeholder nodes.
    pub fn unresolved(&self) -> Vec<&'t str> {
        self.tree.unresolved()
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
