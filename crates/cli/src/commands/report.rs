// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeMap;
use std::path::Path;

use epicscope_core::{
    system_clock, CancelToken, Config, Database, JsonDirSource, Pipeline, Report, SharedClock,
    SharedTextGenerator, StalenessDirective,
};
use tracing::{info, warn};

use crate::cli::GlobalArgs;
use crate::error::{Error, Result};
use crate::text::text_generator;

use super::open_db;

/// Options of one `report` invocation.
#[derive(Debug, Clone, Copy)]
pub struct ReportRequest<'a> {
    pub epic: &'a str,
    pub refresh: &'a str,
    pub source: Option<&'a Path>,
    pub artifacts: &'a [String],
}

pub fn run(global: &GlobalArgs, request: ReportRequest<'_>) -> Result<()> {
    let (db, config) = open_db(global)?;
    let text = text_generator(&config.text.command);
    let report = run_impl(&db, &config, system_clock(), text, request)?;
    println!("{}", report.document);
    Ok(())
}

/// Parse `name=path` artifact flags.
pub(crate) fn parse_artifacts(raw: &[String]) -> Result<BTreeMap<String, String>> {
    raw.iter()
        .map(|entry| match entry.split_once('=') {
            Some((name, path)) if !name.trim().is_empty() && !path.trim().is_empty() => {
                Ok((name.trim().to_string(), path.trim().to_string()))
            }
            _ => Err(Error::InvalidArtifact(entry.clone())),
        })
        .collect()
}

/// Internal implementation that accepts db for testing.
pub(crate) fn run_impl(
    db: &Database,
    config: &Config,
    clock: SharedClock,
    text: SharedTextGenerator,
    request: ReportRequest<'_>,
) -> Result<Report> {
    let directive: StalenessDirective = request.refresh.parse()?;
    let artifacts = parse_artifacts(request.artifacts)?;

    let mut source = request.source.map(|dir| JsonDirSource::new(dir, clock.clone()));
    let mut pipeline = Pipeline::new(db, config, clock, text).with_artifacts(artifacts);
    if let Some(source) = source.as_mut() {
        pipeline = pipeline.with_source(source);
    }

    let report = pipeline.run(request.epic, directive, &CancelToken::new())?;

    if let Some(population) = &report.population {
        info!(
            fetched = population.fetched.len(),
            reused = population.reused.len(),
            "records populated"
        );
        for key in &population.missing {
            warn!(key = %key, "record unavailable; reported as unresolved");
        }
    }
    info!(epic = request.epic, reused = report.reused, "report ready");
    Ok(report)
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
