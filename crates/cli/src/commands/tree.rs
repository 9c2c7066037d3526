// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use epicscope_core::{Database, Tree, TreeNode};

use crate::cli::{GlobalArgs, OutputFormat};
use crate::colors;
use crate::display::render_tree;
use crate::error::Result;

use super::{open_db, print_lines};

pub fn run(global: &GlobalArgs, epic: &str, format: OutputFormat) -> Result<()> {
    let (db, _) = open_db(global)?;
    print_lines(&run_impl(&db, epic, format, colors::should_colorize())?);
    Ok(())
}

/// Internal implementation that accepts db for testing.
pub(crate) fn run_impl(
    db: &Database,
    epic: &str,
    format: OutputFormat,
    color: bool,
) -> Result<Vec<String>> {
    let tree = Tree::build(epic, db)?;
    match format {
        OutputFormat::Text => Ok(render_tree(&tree, color)),
        OutputFormat::Json => {
            let nodes: Vec<&TreeNode> = tree.bfs().collect();
            Ok(vec![serde_json::to_string_pretty(&nodes)?])
        }
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
