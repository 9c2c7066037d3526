// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Issue record types.
//!
//! An [`IssueRecord`] is one retrieved snapshot of a work item together with its
//! change history. Records are immutable once stored; a re-fetch produces a new
//! record with a later `retrieved_at` instead of editing the old one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Classification of work items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    /// Top-level business initiative.
    BusinessEpic,
    /// Portfolio-level epic grouping several team epics.
    PortfolioEpic,
    Initiative,
    /// Team-level epic.
    Epic,
    /// Deliverable unit of work with story points.
    Story,
    Task,
    Bug,
    SubTask,
}

impl IssueType {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::BusinessEpic => "business_epic",
            IssueType::PortfolioEpic => "portfolio_epic",
            IssueType::Initiative => "initiative",
            IssueType::Epic => "epic",
            IssueType::Story => "story",
            IssueType::Task => "task",
            IssueType::Bug => "bug",
            IssueType::SubTask => "sub_task",
        }
    }

    /// Returns true for the epic-like planning types that carry target dates.
    pub fn is_epic_like(&self) -> bool {
        matches!(
            self,
            IssueType::BusinessEpic
                | IssueType::PortfolioEpic
                | IssueType::Initiative
                | IssueType::Epic
        )
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_token(s).as_str() {
            "business_epic" => Ok(IssueType::BusinessEpic),
            "portfolio_epic" => Ok(IssueType::PortfolioEpic),
            "initiative" => Ok(IssueType::Initiative),
            "epic" => Ok(IssueType::Epic),
            "story" | "user_story" => Ok(IssueType::Story),
            "task" => Ok(IssueType::Task),
            "bug" | "defect" => Ok(IssueType::Bug),
            "sub_task" | "subtask" => Ok(IssueType::SubTask),
            _ => Err(Error::InvalidIssueType(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for IssueType {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Workflow status of a work item.
///
/// The domain is unordered: workflows may move between any two states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Idea stage before analysis.
    Funnel,
    Open,
    BacklogForAnalysis,
    Analysis,
    Backlog,
    Refinement,
    Review,
    InProgress,
    Deployment,
    Validation,
    Blocked,
    Resolved,
    Done,
    Closed,
}

impl Status {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Funnel => "funnel",
            Status::Open => "open",
            Status::BacklogForAnalysis => "backlog_for_analysis",
            Status::Analysis => "analysis",
            Status::Backlog => "backlog",
            Status::Refinement => "refinement",
            Status::Review => "review",
            Status::InProgress => "in_progress",
            Status::Deployment => "deployment",
            Status::Validation => "validation",
            Status::Blocked => "blocked",
            Status::Resolved => "resolved",
            Status::Done => "done",
            Status::Closed => "closed",
        }
    }

    /// Returns true if this is a terminal state (resolved, done or closed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Resolved | Status::Done | Status::Closed)
    }

    /// Returns true if this is an active state (not terminal).
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    /// Parses canonical names as well as raw change-log values such as
    /// `New:Analysis[ 10004 ]` or `In Progress`.
    fn from_str(s: &str) -> Result<Self> {
        let cleaned = clean_status(s);
        match normalize_token(cleaned).as_str() {
            "funnel" => Ok(Status::Funnel),
            "open" | "new" | "to_do" | "todo" => Ok(Status::Open),
            "backlog_for_analysis" => Ok(Status::BacklogForAnalysis),
            "analysis" | "in_analysis" => Ok(Status::Analysis),
            "backlog" => Ok(Status::Backlog),
            "refinement" | "in_refinement" => Ok(Status::Refinement),
            "review" | "in_review" => Ok(Status::Review),
            "in_progress" | "in_development" => Ok(Status::InProgress),
            "deployment" | "in_deployment" => Ok(Status::Deployment),
            "validation" | "in_validation" => Ok(Status::Validation),
            "blocked" | "on_hold" => Ok(Status::Blocked),
            "resolved" => Ok(Status::Resolved),
            "done" => Ok(Status::Done),
            "closed" => Ok(Status::Closed),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Strips change-log decoration: a `New:`/`Old:` label and a trailing `[ id ]`.
fn clean_status(raw: &str) -> &str {
    let after_label = raw.rsplit(':').next().unwrap_or(raw);
    let before_id = after_label.split('[').next().unwrap_or(after_label);
    before_id.trim()
}

/// Lowercases and joins words with underscores ("Business Epic" -> "business_epic").
fn normalize_token(raw: &str) -> String {
    raw.trim()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Field touched by an activity entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChangeField {
    Status,
    TargetEnd,
    FixVersion,
    Description,
    AcceptanceCriteria,
    Assignee,
    /// Any field without dedicated handling, kept by its display name.
    Other(String),
}

impl ChangeField {
    /// Returns the display name used by the tracker's change log.
    pub fn as_str(&self) -> &str {
        match self {
            ChangeField::Status => "Status",
            ChangeField::TargetEnd => "Target end",
            ChangeField::FixVersion => "Fix Version/s",
            ChangeField::Description => "Description",
            ChangeField::AcceptanceCriteria => "Acceptance Criteria",
            ChangeField::Assignee => "Assignee",
            ChangeField::Other(name) => name,
        }
    }

    /// Returns true for the fields that carry a schedule commitment.
    pub fn is_schedule(&self) -> bool {
        matches!(self, ChangeField::TargetEnd | ChangeField::FixVersion)
    }
}

impl fmt::Display for ChangeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for ChangeField {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "status" => ChangeField::Status,
            "target end" | "target_end" => ChangeField::TargetEnd,
            "fix version/s" | "fix version" | "fix_versions" => ChangeField::FixVersion,
            "description" => ChangeField::Description,
            "acceptance criteria" => ChangeField::AcceptanceCriteria,
            "assignee" => ChangeField::Assignee,
            _ => ChangeField::Other(s.trim().to_string()),
        }
    }
}

impl Serialize for ChangeField {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ChangeField {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        Ok(ChangeField::from(raw.as_str()))
    }
}

#[cfg(feature = "schemars")]
impl schemars::JsonSchema for ChangeField {
    fn schema_name() -> String {
        "ChangeField".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        String::json_schema(gen)
    }
}

/// One timestamped entry of an issue's change history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct Activity {
    /// Which field changed.
    #[serde(alias = "feld_name")]
    pub field: ChangeField,
    /// Value before the change.
    #[serde(default, alias = "alter_wert", skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    /// Value after the change.
    #[serde(default, alias = "neuer_wert", skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    /// Who made the change.
    #[serde(default, alias = "benutzer", skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// When the change happened.
    #[serde(alias = "zeitstempel_iso")]
    pub at: DateTime<Utc>,
}

impl Activity {
    /// Creates an activity with no values set.
    pub fn new(field: ChangeField, at: DateTime<Utc>) -> Self {
        Activity {
            field,
            old_value: None,
            new_value: None,
            author: None,
            at,
        }
    }

    /// Sets the old and new values (builder pattern).
    pub fn with_values(mut self, old: Option<&str>, new: Option<&str>) -> Self {
        self.old_value = old.map(str::to_string);
        self.new_value = new.map(str::to_string);
        self
    }

    /// Sets the author (builder pattern).
    pub fn with_author(mut self, author: &str) -> Self {
        self.author = Some(author.to_string());
        self
    }

    /// Parses the new value as a status, if this is a status change.
    pub fn new_status(&self) -> Option<Status> {
        if self.field != ChangeField::Status {
            return None;
        }
        self.new_value.as_deref().and_then(|v| v.parse().ok())
    }

    /// Parses the old value as a status, if this is a status change.
    pub fn old_status(&self) -> Option<Status> {
        if self.field != ChangeField::Status {
            return None;
        }
        self.old_value.as_deref().and_then(|v| v.parse().ok())
    }
}

/// Reference from one record to another (child or realized-by link).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct IssueRef {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl IssueRef {
    pub fn new(key: &str) -> Self {
        IssueRef {
            key: key.to_string(),
            title: None,
            summary: None,
            url: None,
        }
    }
}

/// A retrieved snapshot of one work item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct IssueRecord {
    /// Unique identifier (format: `{PROJECT}-{number}`).
    pub key: String,
    /// Classification of the item.
    pub issue_type: IssueType,
    /// Short description of the work.
    pub title: String,
    /// Current workflow state.
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_points: Option<f64>,
    /// Raw planned start, as entered in the tracker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_start: Option<String>,
    /// Raw planned end, as entered in the tracker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_end: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fix_versions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Declared containment children.
    #[serde(default, alias = "child_issues", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<IssueRef>,
    /// Declared realized-by references.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub realized_by: Vec<IssueRef>,
    /// Change history, in the order it was recorded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub activities: Vec<Activity>,
    /// When this snapshot was retrieved from the source.
    pub retrieved_at: DateTime<Utc>,
}

impl IssueRecord {
    /// Creates a record with no links or history.
    pub fn new(
        key: &str,
        issue_type: IssueType,
        title: &str,
        status: Status,
        retrieved_at: DateTime<Utc>,
    ) -> Self {
        IssueRecord {
            key: key.to_string(),
            issue_type,
            title: title.to_string(),
            status,
            resolution: None,
            assignee: None,
            description: None,
            story_points: None,
            target_start: None,
            target_end: None,
            fix_versions: Vec::new(),
            labels: Vec::new(),
            created_at: None,
            children: Vec::new(),
            realized_by: Vec::new(),
            activities: Vec::new(),
            retrieved_at,
        }
    }

    /// Adds a containment child (builder pattern).
    pub fn with_child(mut self, key: &str) -> Self {
        self.children.push(IssueRef::new(key));
        self
    }

    /// Adds a realized-by reference (builder pattern).
    pub fn with_realized_by(mut self, key: &str) -> Self {
        self.realized_by.push(IssueRef::new(key));
        self
    }

    /// Appends a history entry (builder pattern).
    pub fn with_activity(mut self, activity: Activity) -> Self {
        self.activities.push(activity);
        self
    }

    /// Sets the creation time (builder pattern).
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Sets the story point estimate (builder pattern).
    pub fn with_story_points(mut self, points: f64) -> Self {
        self.story_points = Some(points);
        self
    }

    /// Project part of the key ("ABC" for "ABC-123").
    pub fn project(&self) -> &str {
        project_of(&self.key)
    }

    /// Creation time, falling back to the earliest recorded activity.
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created_at
            .or_else(|| self.activities.iter().map(|a| a.at).min())
    }

    /// Activities sorted by timestamp, stable for equal timestamps.
    pub fn sorted_activities(&self) -> Vec<&Activity> {
        let mut sorted: Vec<&Activity> = self.activities.iter().collect();
        sorted.sort_by_key(|a| a.at);
        sorted
    }

    /// Time of the most recent transition into a terminal status.
    pub fn last_terminal_transition(&self) -> Option<DateTime<Utc>> {
        self.activities
            .iter()
            .filter(|a| a.new_status().is_some_and(|s| s.is_terminal()))
            .map(|a| a.at)
            .max()
    }
}

/// Project part of an issue key ("ABC" for "ABC-123"); the whole key when there is no dash.
pub fn project_of(key: &str) -> &str {
    key.split_once('-').map(|(prefix, _)| prefix).unwrap_or(key)
}

#[cfg(test)]
#[path = "issue_tests.rs"]
mod tests;
