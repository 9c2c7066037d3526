// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! epicscope-core: epic hierarchy analysis
//!
//! This crate provides the record model, the local store, the staleness
//! policy, tree construction, the analyzers and the report pipeline used by
//! the epicscope CLI.

pub mod analyzer;
pub mod clock;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod issue;
pub mod merge;
pub mod pipeline;
pub mod populate;
pub mod provider;
pub mod runner;
pub mod source;
pub mod staleness;
pub mod text;
pub mod tree;

pub use analyzer::{Analyzer, AnalyzerKind, AnalyzerRegistry, AnalyzerResult, Granularity, Metrics};
pub use clock::{system_clock, ClockSource, FixedClock, SharedClock, SystemClock};
pub use config::Config;
pub use db::{Database, StoredComposite};
pub use error::{Error, Result};
pub use issue::{Activity, ChangeField, IssueRecord, IssueRef, IssueType, Status};
pub use merge::{CacheDecision, CompositeSummary, MergeOutcome, SummaryMerger};
pub use pipeline::{Pipeline, Report};
pub use populate::{PopulationReport, Populator};
pub use provider::DataProvider;
pub use runner::{AnalysisRunner, CancelToken};
pub use source::{JsonDirSource, RecordLookup, RecordSource};
pub use staleness::{StalenessDirective, StalenessPolicy};
pub use text::{SharedTextGenerator, TextGenerator, Unavailable};
pub use tree::{CrossLink, LinkKind, Tree, TreeNode};
