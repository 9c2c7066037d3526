// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared argument structs for CLI commands.

use clap::Args;
use std::path::PathBuf;

/// Options accepted by every command.
#[derive(Args, Clone, Debug, Default)]
pub struct GlobalArgs {
    /// Record store location (default: $EPICSCOPE_DB or the user data directory)
    #[arg(long, global = true, value_name = "path")]
    pub db: Option<PathBuf>,

    /// Configuration file (default: $EPICSCOPE_CONFIG or the user config directory)
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write logs to a file instead of stderr
    #[arg(long, global = true, value_name = "path")]
    pub log_file: Option<PathBuf>,
}
