// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Issue tree construction.
//!
//! Nodes live in one arena keyed by issue key. Ownership edges are key lists
//! on the parent; every other relation is a [`CrossLink`] that is never
//! traversed as ownership, so cyclic references cannot cause re-entry.
//!
//! Traversal is breadth-first from the root. For each node the declared
//! containment children come first, then the declared realized-by targets.
//! A target seen for the first time is adopted as an owned child; a target
//! already in the tree becomes a cross-link.

use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::issue::IssueRecord;
use crate::source::RecordLookup;

/// Relation kind of an edge between two issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Parent/child containment.
    Contains,
    /// "This issue is realized by that one."
    RealizedBy,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Contains => "contains",
            LinkKind::RealizedBy => "realized_by",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Non-owning reference from one node to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossLink {
    pub target: String,
    pub kind: LinkKind,
}

/// One issue in the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub key: String,
    /// `None` when no record could be found; the node is an unresolved placeholder.
    pub record: Option<IssueRecord>,
    /// Owning parent; `None` only for the root.
    pub parent: Option<String>,
    /// Relation through which the parent adopted this node.
    pub adopted_via: Option<LinkKind>,
    pub depth: usize,
    /// Owned children in discovery order.
    pub children: Vec<String>,
    pub cross_links: Vec<CrossLink>,
}

impl TreeNode {
    fn new(key: &str, record: Option<IssueRecord>) -> Self {
        TreeNode {
            key: key.to_string(),
            record,
            parent: None,
            adopted_via: None,
            depth: 0,
            children: Vec::new(),
            cross_links: Vec::new(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.record.is_some()
    }
}

/// An epic and every issue transitively linked to it.
#[derive(Debug, Clone)]
pub struct Tree {
    root: String,
    nodes: HashMap<String, TreeNode>,
    order: Vec<String>,
}

impl Tree {
    /// Builds the tree rooted at `root`.
    ///
    /// Fails only when the root itself is unknown or the lookup errors; missing
    /// descendants become unresolved placeholders.
    pub fn build<L: RecordLookup + ?Sized>(root: &str, lookup: &L) -> Result<Tree> {
        let root_record = lookup
            .lookup(root)?
            .ok_or_else(|| Error::IssueNotFound(root.to_string()))?;

        let mut tree = Tree {
            root: root.to_string(),
            nodes: HashMap::new(),
            order: Vec::new(),
        };
        tree.insert(TreeNode::new(root, Some(root_record)));

        let mut queue = VecDeque::from([root.to_string()]);
        while let Some(key) = queue.pop_front() {
            for (target, kind) in tree.declared_links(&key) {
                if target == key {
                    warn!(key = %key, relation = %kind, "ignoring self reference");
                    continue;
                }
                if tree.nodes.contains_key(&target) {
                    tree.link(&key, target, kind);
                    continue;
                }

                let record = lookup.lookup(&target)?;
                if record.is_none() {
                    warn!(key = %target, referenced_by = %key, "record not found; keeping unresolved placeholder");
                }
                tree.adopt(&key, TreeNode::new(&target, record), kind);
                queue.push_back(target);
            }
        }

        debug!(root, nodes = tree.len(), unresolved = tree.unresolved().len(), "built tree");
        Ok(tree)
    }

    /// Declared links of a node, containment first, duplicates collapsed.
    fn declared_links(&self, key: &str) -> Vec<(String, LinkKind)> {
        let Some(record) = self.nodes.get(key).and_then(|n| n.record.as_ref()) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        record
            .children
            .iter()
            .map(|r| (r.key.clone(), LinkKind::Contains))
            .chain(
                record
                    .realized_by
                    .iter()
                    .map(|r| (r.key.clone(), LinkKind::RealizedBy)),
            )
            .filter(|(target, _)| seen.insert(target.clone()))
            .collect()
    }

    fn insert(&mut self, node: TreeNode) {
        self.order.push(node.key.clone());
        self.nodes.insert(node.key.clone(), node);
    }

    fn adopt(&mut self, parent: &str, mut child: TreeNode, kind: LinkKind) {
        let Some(owner) = self.nodes.get_mut(parent) else {
            return;
        };
        owner.children.push(child.key.clone());
        child.parent = Some(parent.to_string());
        child.adopted_via = Some(kind);
        child.depth = owner.depth + 1;
        self.insert(child);
    }

    fn link(&mut self, from: &str, target: String, kind: LinkKind) {
        if kind == LinkKind::Contains {
            let owner = self.nodes.get(&target).and_then(|n| n.parent.clone());
            warn!(
                key = %target,
                claimed_by = %from,
                owner = owner.as_deref().unwrap_or("<root>"),
                "containment would re-parent an owned issue; recording cross-link"
            );
        }
        if let Some(node) = self.nodes.get_mut(from) {
            node.cross_links.push(CrossLink { target, kind });
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn root_node(&self) -> Option<&TreeNode> {
        self.nodes.get(&self.root)
    }

    pub fn get(&self, key: &str) -> Option<&TreeNode> {
        self.nodes.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in breadth-first ownership order, root first.
    pub fn bfs(&self) -> impl Iterator<Item = &TreeNode> {
        self.order.iter().filter_map(|key| self.nodes.get(key))
    }

    /// Owned children of `key`, in discovery order.
    pub fn children(&self, key: &str) -> Vec<&TreeNode> {
        self.nodes
            .get(key)
            .map(|n| n.children.iter().filter_map(|c| self.nodes.get(c)).collect())
            .unwrap_or_default()
    }

    pub fn parent(&self, key: &str) -> Option<&TreeNode> {
        self.nodes
            .get(key)
            .and_then(|n| n.parent.as_deref())
            .and_then(|p| self.nodes.get(p))
    }

    /// Owning ancestors of `key`, nearest first.
    pub fn ancestors(&self, key: &str) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut current = self.nodes.get(key).and_then(|n| n.parent.as_deref());
        while let Some(parent) = current {
            chain.push(parent);
            current = self.nodes.get(parent).and_then(|n| n.parent.as_deref());
        }
        chain
    }

    /// Keys of placeholder nodes whose record could not be found.
    pub fn unresolved(&self) -> Vec<&str> {
        self.bfs()
            .filter(|n| !n.is_resolved())
            .map(|n| n.key.as_str())
            .collect()
    }

    pub fn max_depth(&self) -> usize {
        self.nodes.values().map(|n| n.depth).max().unwrap_or(0)
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
