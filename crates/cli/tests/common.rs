// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Command isolated from the user's store, config and terminal.
pub fn es(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("epicscope");
    cmd.current_dir(temp.path())
        .env("EPICSCOPE_DB", temp.path().join("records.db"))
        .env_remove("EPICSCOPE_CONFIG")
        .env_remove("RUST_LOG")
        .env("XDG_CONFIG_HOME", temp.path().join("xdg"))
        .env("HOME", temp.path())
        .env("NO_COLOR", "1");
    cmd
}

/// Write a record document into `dir`, creating it if needed.
pub fn write_record(dir: &Path, key: &str, body: &str) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(format!("{key}.json"));
    std::fs::write(&path, body).unwrap();
    path
}

/// Export directory holding a small epic with two stories.
pub fn sample_export(temp: &TempDir) -> PathBuf {
    let dir = temp.path().join("export");
    write_record(
        &dir,
        "EPIC-1",
        r#"{"key": "EPIC-1", "issue_type": "Epic", "title": "Checkout", "status": "In Progress",
            "created_at": "2024-05-01T09:00:00Z",
            "retrieved_at": "2024-06-01T12:00:00Z",
            "children": [{"key": "STORY-1"}, {"key": "STORY-2"}]}"#,
    );
    write_record(
        &dir,
        "STORY-1",
        r#"{"key": "STORY-1", "issue_type": "Story", "title": "Cart", "status": "Done",
            "story_points": 3, "created_at": "2024-05-01T10:00:00Z",
            "retrieved_at": "2024-06-01T12:00:00Z"}"#,
    );
    write_record(
        &dir,
        "STORY-2",
        r#"{"key": "STORY-2", "issue_type": "Story", "title": "Pay", "status": "Open",
            "story_points": 5, "created_at": "2024-05-01T11:00:00Z",
            "retrieved_at": "2024-06-01T12:00:00Z"}"#,
    );
    dir
}

/// Temp directory whose store already holds the sample epic.
pub fn imported_temp() -> TempDir {
    let temp = TempDir::new().unwrap();
    let export = sample_export(&temp);
    es(&temp).arg("import").arg(&export).assert().success();
    temp
}
