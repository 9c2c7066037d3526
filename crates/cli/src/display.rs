// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Text rendering for trees and analyzer results.

use std::collections::BTreeMap;

use epicscope_core::{AnalyzerKind, AnalyzerResult, LinkKind, Tree, TreeNode};
use serde_json::Value;

use crate::colors;

/// Line for one node, without tree connectors.
pub fn format_node(node: &TreeNode) -> String {
    let Some(record) = &node.record else {
        return format!("{}: (unresolved)", node.key);
    };

    let via = match node.adopted_via {
        Some(LinkKind::RealizedBy) => " (realized by)",
        _ => "",
    };
    format!(
        "{}: {} [{}, {}]{}",
        node.key, record.title, record.issue_type, record.status, via
    )
}

/// Cross-link summary lines for a node, one per relation kind.
fn link_lines(node: &TreeNode) -> Vec<String> {
    let mut by_kind: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for link in &node.cross_links {
        let label = match link.kind {
            LinkKind::Contains => "also contains",
            LinkKind::RealizedBy => "also realized by",
        };
        by_kind.entry(label).or_default().push(&link.target);
    }
    by_kind
        .into_iter()
        .map(|(label, targets)| format!("({} {})", label, targets.join(", ")))
        .collect()
}

fn styled(color: bool, paint: fn(&str) -> String, text: &str) -> String {
    if color {
        paint(text)
    } else {
        text.to_string()
    }
}

/// Render the whole tree, root first, children in discovery order.
pub fn render_tree(tree: &Tree, color: bool) -> Vec<String> {
    let mut lines = Vec::new();
    let Some(root) = tree.root_node() else {
        return lines;
    };
    lines.push(format_node(root));
    render_children(tree, root, "", color, &mut lines);
    lines
}

fn render_children(
    tree: &Tree,
    node: &TreeNode,
    prefix: &str,
    color: bool,
    lines: &mut Vec<String>,
) {
    let children = tree.children(&node.key);
    let links = link_lines(node);
    let total = children.len() + links.len();

    for (i, child) in children.iter().enumerate() {
        let is_last = i + 1 == total;
        let connector = if is_last { "└── " } else { "├── " };
        lines.push(format!("{}{}{}", prefix, connector, format_node(child)));

        let child_prefix = if is_last {
            format!("{}    ", prefix)
        } else {
            format!("{}│   ", prefix)
        };
        render_children(tree, child, &child_prefix, color, lines);
    }

    for (i, line) in links.iter().enumerate() {
        let is_last = children.len() + i + 1 == total;
        let connector = if is_last { "└── " } else { "├── " };
        lines.push(format!("{}{}{}", prefix, connector, styled(color, colors::context, line)));
    }
}

/// Short text form of a metric value.
pub fn format_metric(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => format!("{} entries", items.len()),
        Value::Object(fields) => format!("{} keys", fields.len()),
        other => other.to_string(),
    }
}

/// Render analyzer results: a header per analyzer followed by its metrics.
pub fn render_results(
    results: &BTreeMap<AnalyzerKind, AnalyzerResult>,
    color: bool,
) -> Vec<String> {
    let mut lines = Vec::new();
    for (kind, result) in results {
        lines.push(styled(color, colors::header, &format!("{}:", kind)));
        if let Some(reason) = &result.failure {
            lines.push(format!("  failed: {}", reason));
            continue;
        }
        for (name, value) in &result.metrics {
            lines.push(format!(
                "  {}: {}",
                styled(color, colors::literal, name),
                format_metric(value)
            ));
        }
    }
    lines
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
