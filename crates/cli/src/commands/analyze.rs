// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Ad-hoc analyzer runs. Results are printed, never cached.

use std::collections::BTreeMap;

use epicscope_core::{
    system_clock, AnalysisRunner, AnalyzerKind, AnalyzerRegistry, AnalyzerResult, CancelToken,
    Config, DataProvider, Database, SharedClock, SharedTextGenerator, Tree,
};

use crate::cli::{GlobalArgs, OutputFormat};
use crate::colors;
use crate::display::render_results;
use crate::error::Result;
use crate::text::text_generator;

use super::{open_db, print_lines};

pub fn run(global: &GlobalArgs, epic: &str, only: &[String], format: OutputFormat) -> Result<()> {
    let (db, config) = open_db(global)?;
    let text = text_generator(&config.text.command);
    let results = run_impl(&db, &config, system_clock(), text, epic, only)?;
    print_lines(&render(&results, format, colors::should_colorize())?);
    Ok(())
}

/// Analyzers named by `--only`, or the configured set when none are named.
pub(crate) fn selected_kinds(config: &Config, only: &[String]) -> Result<Vec<AnalyzerKind>> {
    if only.is_empty() {
        return Ok(config.analyzers.enabled.clone());
    }
    let kinds = only
        .iter()
        .map(|name| name.parse::<AnalyzerKind>())
        .collect::<epicscope_core::Result<Vec<_>>>()?;
    Ok(kinds)
}

/// Internal implementation that accepts db for testing.
pub(crate) fn run_impl(
    db: &Database,
    config: &Config,
    clock: SharedClock,
    text: SharedTextGenerator,
    epic: &str,
    only: &[String],
) -> Result<BTreeMap<AnalyzerKind, AnalyzerResult>> {
    let kinds = selected_kinds(config, only)?;
    let registry = AnalyzerRegistry::for_kinds(&kinds, config, clock, text);

    let tree = Tree::build(epic, db)?;
    let provider = DataProvider::new(&tree);
    Ok(AnalysisRunner::run(&provider, &registry, &CancelToken::new())?)
}

pub(crate) fn render(
    results: &BTreeMap<AnalyzerKind, AnalyzerResult>,
    format: OutputFormat,
    color: bool,
) -> Result<Vec<String>> {
    match format {
        OutputFormat::Text => Ok(render_results(results, color)),
        OutputFormat::Json => Ok(vec![serde_json::to_string_pretty(results)?]),
    }
}

#[cfg(test)]
#[path = "analyze_tests.rs"]
mod tests;
