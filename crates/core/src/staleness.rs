// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Refresh decisions for cached records and derived artifacts.
//!
//! One [`StalenessDirective`] is supplied per invocation and applied
//! independently at every decision point: once per issue while populating the
//! record store, and once for the epic's composite summary.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::clock::{ClockSource, SharedClock};
use crate::config::StalenessConfig;
use crate::error::{Error, Result};
use crate::issue::IssueRecord;

/// Tri-state refresh directive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalenessDirective {
    /// Always regenerate.
    Force,
    /// Never regenerate; a missing cache entry is an error.
    Skip,
    /// Regenerate when missing or stale.
    #[default]
    Check,
}

impl StalenessDirective {
    /// Returns the string representation used in flags and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            StalenessDirective::Force => "force",
            StalenessDirective::Skip => "skip",
            StalenessDirective::Check => "check",
        }
    }
}

impl fmt::Display for StalenessDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StalenessDirective {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "force" | "true" => Ok(StalenessDirective::Force),
            "skip" | "false" => Ok(StalenessDirective::Skip),
            "check" => Ok(StalenessDirective::Check),
            _ => Err(Error::InvalidDirective(s.to_string())),
        }
    }
}

/// Pure freshness rule: is a timestamp older than the window at `now`?
///
/// An age exactly equal to the window is still fresh.
pub fn is_expired(existing: DateTime<Utc>, window: Duration, now: DateTime<Utc>) -> bool {
    now - existing > window
}

/// Decides whether cached data may be reused.
#[derive(Clone)]
pub struct StalenessPolicy {
    window: Duration,
    closed_grace: Duration,
    clock: SharedClock,
}

impl StalenessPolicy {
    pub fn new(config: &StalenessConfig, clock: SharedClock) -> Self {
        StalenessPolicy {
            window: config.window(),
            closed_grace: config.closed_grace(),
            clock,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Artifact form: should the artifact cached at `existing` be recomputed?
    ///
    /// `artifact` and `id` only name the artifact in the error raised when
    /// `Skip` finds nothing cached.
    pub fn should_refresh(
        &self,
        directive: StalenessDirective,
        artifact: &'static str,
        id: &str,
        existing: Option<DateTime<Utc>>,
    ) -> Result<bool> {
        let refresh = match (directive, existing) {
            (StalenessDirective::Force, _) => true,
            (StalenessDirective::Skip, Some(_)) => false,
            (StalenessDirective::Skip, None) => {
                return Err(Error::NoCachedArtifact {
                    artifact,
                    id: id.to_string(),
                })
            }
            (StalenessDirective::Check, None) => true,
            (StalenessDirective::Check, Some(at)) => {
                is_expired(at, self.window, self.clock.now())
            }
        };
        debug!(artifact, id, %directive, refresh, "staleness decision");
        Ok(refresh)
    }

    /// Issue form: like [`should_refresh`](Self::should_refresh), but under
    /// `Check` an issue in a non-terminal status is always stale, and a
    /// terminal one is stale while its closing is within the grace period.
    pub fn should_refresh_issue(
        &self,
        directive: StalenessDirective,
        key: &str,
        existing: Option<&IssueRecord>,
    ) -> Result<bool> {
        let retrieved = existing.map(|r| r.retrieved_at);
        let by_age = self.should_refresh(directive, "record", key, retrieved)?;
        let (StalenessDirective::Check, Some(record)) = (directive, existing) else {
            return Ok(by_age);
        };
        if by_age || record.status.is_active() {
            return Ok(true);
        }
        Ok(self.within_closed_grace(record))
    }

    fn within_closed_grace(&self, record: &IssueRecord) -> bool {
        if self.closed_grace <= Duration::zero() {
            return false;
        }
        record
            .last_terminal_transition()
            .is_some_and(|closed| self.clock.now() - closed <= self.closed_grace)
    }
}

#[cfg(test)]
#[path = "staleness_tests.rs"]
mod tests;
