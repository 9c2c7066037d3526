// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All errors surfaced by the epicscope CLI.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] epicscope_core::Error),

    #[error("invalid artifact '{0}'\n  hint: use name=path, e.g. --artifact tree=out/tree.png")]
    InvalidArtifact(String),

    #[error("invalid record file {path}: {reason}")]
    InvalidRecord { path: String, reason: String },

    #[error("no record files found in {0}")]
    NothingToImport(String),

    #[error("cannot determine a data directory\n  hint: pass --db or set EPICSCOPE_DB")]
    NoDataDir,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
