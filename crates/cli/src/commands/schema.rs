// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Schema command implementation.
//!
//! Outputs JSON Schema for the documents epicscope reads and writes.

use epicscope_core::{CompositeSummary, IssueRecord};
use schemars::schema_for;

use crate::cli::SchemaCommand;
use crate::error::Result;

/// Run the schema command.
pub fn run(cmd: SchemaCommand) -> Result<()> {
    println!("{}", render(cmd)?);
    Ok(())
}

pub(crate) fn render(cmd: SchemaCommand) -> Result<String> {
    let schema = match cmd {
        SchemaCommand::Record => schema_for!(IssueRecord),
        SchemaCommand::Composite => schema_for!(CompositeSummary),
    };
    Ok(serde_json::to_string_pretty(&schema)?)
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
