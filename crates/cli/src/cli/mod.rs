// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use crate::colors;
use crate::help;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub use args::GlobalArgs;

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.trim().to_string())
    }
}

#[derive(Parser)]
#[command(name = "epicscope")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Analyze epic hierarchies scraped from an issue tracker")]
#[command(
    long_about = "Analyze epic hierarchies scraped from an issue tracker.\n\n\
    Records are kept in a local store with their retrieval time; reports are merged from \
    independent analyzers and cached until stale."
)]
#[command(after_help = help::quickstart())]
#[command(styles = help::styles())]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load record documents into the store
    #[command(
        arg_required_else_help = true,
        after_help = colors::examples("\
Examples:
  epicscope import EPIC-1.json              Import one record
  epicscope import ./export/                Import every .json file in a directory")
    )]
    Import {
        /// Record files or directories of record files
        #[arg(num_args = 1.., value_name = "PATH")]
        paths: Vec<PathBuf>,
    },

    /// Show the issue hierarchy under an epic
    #[command(after_help = colors::examples("\
Examples:
  epicscope tree EPIC-1                Render as text
  epicscope tree EPIC-1 -f json        Emit nodes as JSON"))]
    Tree {
        /// Root epic key
        #[arg(value_parser = non_empty_string)]
        epic: String,

        /// Output format
        #[arg(long, short, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Run analyzers over stored records without touching the report cache
    #[command(after_help = colors::examples("\
Examples:
  epicscope analyze EPIC-1                         All enabled analyzers
  epicscope analyze EPIC-1 --only scope,backlog    Selected analyzers"))]
    Analyze {
        /// Root epic key
        #[arg(value_parser = non_empty_string)]
        epic: String,

        /// Analyzers to run (scope, status, time_creep, backlog)
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Build the composite report for an epic, reusing a fresh one
    #[command(after_help = colors::examples("\
Examples:
  epicscope report EPIC-1                             Reuse if fresh
  epicscope report EPIC-1 --refresh force             Always recompute
  epicscope report EPIC-1 --refresh skip              Cached report only
  epicscope report EPIC-1 --source ./export/          Refresh records first
  epicscope report EPIC-1 --artifact tree=tree.png    Record an artifact path"))]
    Report {
        /// Root epic key
        #[arg(value_parser = non_empty_string)]
        epic: String,

        /// Staleness directive: force, skip or check
        #[arg(long, default_value = "check")]
        refresh: String,

        /// Directory of record documents used to refresh stale records
        #[arg(long, value_name = "dir")]
        source: Option<PathBuf>,

        /// Artifact path to record in the report
        #[arg(long = "artifact", value_name = "name=path")]
        artifacts: Vec<String>,
    },

    /// Output JSON Schema for stored documents
    #[command(
        subcommand,
        after_help = colors::examples("\
Examples:
  epicscope schema record       Schema of an imported record
  epicscope schema composite    Schema of a report")
    )]
    Schema(SchemaCommand),
}

/// Schema output commands.
#[derive(Subcommand, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemaCommand {
    /// Output JSON Schema for an issue record
    Record,
    /// Output JSON Schema for a composite report
    Composite,
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
