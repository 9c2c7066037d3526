// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for epicscope-core operations.

use thiserror::Error;

/// All possible errors that can occur in epicscope-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("issue not found: {0}")]
    IssueNotFound(String),

    #[error("no cached {artifact} for {id}\n  hint: run again with --refresh check or --refresh force")]
    NoCachedArtifact { artifact: &'static str, id: String },

    #[error("analyzer '{kind}' failed: {reason}")]
    AnalyzerFailed { kind: String, reason: String },

    #[error("inconsistent '{kind}' result: {reason}")]
    MergeInconsistency { kind: String, reason: String },

    #[error("analysis cancelled")]
    Cancelled,

    #[error("text generation failed: {0}")]
    TextGeneration(String),

    #[error(
        "invalid issue type: '{0}'\n  hint: valid types are: business_epic, portfolio_epic, initiative, epic, story, task, bug, sub_task"
    )]
    InvalidIssueType(String),

    #[error("invalid status: '{0}'")]
    InvalidStatus(String),

    #[error("invalid refresh directive: '{0}'\n  hint: valid directives are: force, skip, check")]
    InvalidDirective(String),

    #[error("invalid analyzer: '{0}'\n  hint: valid analyzers are: scope, status, time_creep, backlog")]
    InvalidAnalyzer(String),

    #[error("invalid granularity: '{0}'\n  hint: valid granularities are: daily, weekly")]
    InvalidGranularity(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for epicscope-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
