// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod analyze;
pub mod import;
pub mod report;
pub mod schema;
#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;
pub mod tree;

use epicscope_core::{Config, Database};
use tracing::debug;

use crate::cli::GlobalArgs;
use crate::config::{db_path, load_config};
use crate::error::Result;

/// Helper to open the store and load configuration for a command.
pub fn open_db(global: &GlobalArgs) -> Result<(Database, Config)> {
    let config = load_config(global.config.as_deref())?;
    let path = db_path(global.db.as_deref())?;
    debug!(path = %path.display(), "opening record store");
    let db = Database::open(&path)?;
    Ok((db, config))
}

/// Print rendered lines to stdout.
fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
