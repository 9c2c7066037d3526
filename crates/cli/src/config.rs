// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration file and store location resolution.
//!
//! Both follow the same order: explicit flag, environment variable, then the
//! per-user directory. A missing default config file means default settings.

use std::fs;
use std::path::{Path, PathBuf};

use epicscope_core::Config;
use tracing::debug;

use crate::env;
use crate::error::{Error, Result};

const APP_DIR_NAME: &str = "epicscope";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "records.db";

/// Parse a TOML configuration document.
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).map_err(|e| Error::Config(format!("failed to parse config: {}", e)))
}

/// Read a configuration file that must exist.
pub fn read_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
    parse_config(&content)
}

/// Load configuration from the first location that applies.
///
/// An explicit or environment-provided path must exist; the per-user file is
/// optional.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit.map(Path::to_path_buf).or_else(env::config_path) {
        debug!(path = %path.display(), "loading config");
        return read_config(&path);
    }

    match default_config_path() {
        Some(path) if path.is_file() => {
            debug!(path = %path.display(), "loading user config");
            read_config(&path)
        }
        _ => Ok(Config::default()),
    }
}

/// `<config dir>/epicscope/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Pick the store path from explicit, environment and platform values.
pub fn resolve_db_path(
    explicit: Option<&Path>,
    from_env: Option<PathBuf>,
    data_dir: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = from_env {
        return Ok(path);
    }
    data_dir
        .map(|d| d.join(APP_DIR_NAME).join(DB_FILE_NAME))
        .ok_or(Error::NoDataDir)
}

/// Store path for this process.
pub fn db_path(explicit: Option<&Path>) -> Result<PathBuf> {
    resolve_db_path(explicit, env::db_path(), dirs::data_dir())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
