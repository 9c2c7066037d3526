// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn test_core_error_is_transparent() {
    let err: Error = epicscope_core::Error::IssueNotFound("EPIC-1".to_string()).into();
    assert_eq!(err.to_string(), "issue not found: EPIC-1");
}

#[test]
fn test_invalid_artifact_has_hint() {
    let msg = Error::InvalidArtifact("tree".to_string()).to_string();
    assert!(msg.contains("'tree'"));
    assert!(msg.contains("hint: use name=path"));
}

#[test]
fn test_no_data_dir_mentions_env() {
    assert!(Error::NoDataDir.to_string().contains("EPICSCOPE_DB"));
}

#[test]
fn test_io_error_converts() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err: Error = io.into();
    assert!(matches!(err, Error::Io(_)));
    assert!(err.to_string().starts_with("io error:"));
}

#[test]
fn test_invalid_record_names_the_file() {
    let err = Error::InvalidRecord {
        path: "export/EPIC-1.json".to_string(),
        reason: "missing field `key`".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "invalid record file export/EPIC-1.json: missing field `key`"
    );
}
