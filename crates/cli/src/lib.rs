// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! epicscope - epic hierarchy analysis from the command line.
//!
//! This crate wires the [`epicscope_core`] pipeline to a CLI: configuration
//! and store discovery, the external text generator, and text rendering.
//!
//! # Main Components
//!
//! - [`Cli`] - argument definitions
//! - [`config`] - configuration file and store path resolution
//! - [`text::CommandTextGenerator`] - summariser backed by an external program
//! - [`Error`] - error types for all commands

mod cli;
pub mod colors;
mod commands;
mod display;
pub mod help;

pub mod config;
pub mod env;
pub mod error;
pub mod logging;
pub mod text;

pub use cli::{Cli, Command, GlobalArgs, OutputFormat, SchemaCommand};
pub use error::{Error, Result};

use commands::report::ReportRequest;

/// Dispatch a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let global = &cli.global;
    match cli.command {
        Command::Import { paths } => commands::import::run(global, &paths),
        Command::Tree { epic, format } => commands::tree::run(global, &epic, format),
        Command::Analyze {
            epic,
            only,
            format,
        } => commands::analyze::run(global, &epic, &only, format),
        Command::Report {
            epic,
            refresh,
            source,
            artifacts,
        } => commands::report::run(
            global,
            ReportRequest {
                epic: &epic,
                refresh: &refresh,
                source: source.as_deref(),
                artifacts: &artifacts,
            },
        ),
        Command::Schema(cmd) => commands::schema::run(cmd),
    }
}
