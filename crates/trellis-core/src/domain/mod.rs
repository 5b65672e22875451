//! Domain types for project tracking.
//!
//! This module contains the entities the core computes over: projects,
//! epics, issues (including sub-issues), milestones and the dependency
//! relation between issues.

mod tree;

pub use tree::{AssemblyWarning, EpicTree, IssueTree, ProjectTree};

use crate::error::ValidationError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Highest priority value (0 = most urgent)
pub const MIN_PRIORITY: u8 = 0;

/// Lowest priority value
pub const MAX_PRIORITY: u8 = 3;

/// Maximum length of an issue title, in characters
pub const MAX_TITLE_LENGTH: usize = 200;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new identifier
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

id_type!(
    /// Unique identifier for a project
    ProjectId
);
id_type!(
    /// Unique identifier for an epic
    EpicId
);
id_type!(
    /// Unique identifier for an issue or sub-issue
    IssueId
);
id_type!(
    /// Unique identifier for a milestone
    MilestoneId
);
id_type!(
    /// Identifier of a node in the flattened hierarchy, borrowed from the
    /// underlying entity's id
    NodeId
);

impl From<&ProjectId> for NodeId {
    fn from(id: &ProjectId) -> Self {
        Self(id.0.clone())
    }
}

impl From<&EpicId> for NodeId {
    fn from(id: &EpicId) -> Self {
        Self(id.0.clone())
    }
}

impl From<&IssueId> for NodeId {
    fn from(id: &IssueId) -> Self {
        Self(id.0.clone())
    }
}

/// Workflow status of an issue.
///
/// This is a closed set: no other status value is valid anywhere in counts,
/// transitions or filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    /// Not started
    Todo,

    /// Being worked on
    Doing,

    /// Waiting for review
    InReview,

    /// Completed
    Done,

    /// Abandoned; can be reopened
    Canceled,
}

impl IssueStatus {
    /// Every status, in workflow order.
    pub const ALL: [IssueStatus; 5] = [
        IssueStatus::Todo,
        IssueStatus::Doing,
        IssueStatus::InReview,
        IssueStatus::Done,
        IssueStatus::Canceled,
    ];

    /// Wire name of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::InReview => "in_review",
            Self::Done => "done",
            Self::Canceled => "canceled",
        }
    }

    /// `done` and `canceled` satisfy dependencies and count as completed.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Canceled)
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IssueStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidStatus(s.to_string()))
    }
}

/// Lifecycle status shared by projects and epics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    /// Work is ongoing
    #[default]
    Active,

    /// All work finished
    Done,

    /// Abandoned
    Canceled,
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Done => write!(f, "done"),
            Self::Canceled => write!(f, "canceled"),
        }
    }
}

/// An estimate on the Fibonacci scale.
///
/// Only the values in [`StoryPoints::ALLOWED`] can be constructed, so an
/// `Option<StoryPoints>` is always either unestimated or a valid estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct StoryPoints(u8);

impl StoryPoints {
    /// The permitted story point values.
    pub const ALLOWED: [u8; 7] = [1, 2, 3, 5, 8, 13, 21];

    /// Numeric value of the estimate.
    #[must_use]
    pub fn value(self) -> u32 {
        u32::from(self.0)
    }
}

impl TryFrom<u8> for StoryPoints {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if Self::ALLOWED.contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::InvalidStoryPoints(i64::from(value)))
        }
    }
}

impl From<StoryPoints> for u8 {
    fn from(points: StoryPoints) -> Self {
        points.0
    }
}

impl fmt::Display for StoryPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Top-level container of epics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier
    pub id: ProjectId,

    /// Sequential display number (`P-<number>`)
    pub number: u32,

    /// Project name
    pub name: String,

    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Soft-delete marker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,

    /// Lifecycle status
    #[serde(default)]
    pub status: LifecycleStatus,
}

impl Project {
    /// Whether the project has been archived (soft-deleted).
    #[must_use]
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

/// Project-scoped grouping of issues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Epic {
    /// Unique identifier
    pub id: EpicId,

    /// Owning project
    pub project_id: ProjectId,

    /// Display number, unique within the project (`E-<number>`)
    pub number: u32,

    /// Epic name
    pub name: String,

    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Lifecycle status
    #[serde(default)]
    pub status: LifecycleStatus,

    /// Landing bucket for issues created without an explicit epic
    #[serde(default)]
    pub is_default: bool,

    /// Position among the project's epics
    #[serde(default)]
    pub sort_order: i64,

    /// Optional milestone label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<MilestoneId>,
}

/// The resolved side of a dependency edge, as joined by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyTarget {
    /// Target issue id
    pub id: IssueId,

    /// Target display number
    pub number: u32,

    /// Target title
    pub title: String,

    /// Target status at the time the snapshot was taken
    pub status: IssueStatus,
}

impl From<&Issue> for DependencyTarget {
    fn from(issue: &Issue) -> Self {
        Self {
            id: issue.id.clone(),
            number: issue.number,
            title: issue.title.clone(),
            status: issue.status,
        }
    }
}

/// One outgoing dependency of an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// ID of the issue this depends on
    pub depends_on_id: IssueId,

    /// Resolved target, or `None` when the target was not loaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<DependencyTarget>,
}

/// A raw `issue_id -> depends_on_id` row of the dependency relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// The dependent issue
    pub issue_id: IssueId,

    /// The issue it waits on
    pub depends_on_id: IssueId,
}

impl DependencyEdge {
    /// Create an edge meaning `issue_id` depends on `depends_on_id`.
    pub fn new(issue_id: impl Into<IssueId>, depends_on_id: impl Into<IssueId>) -> Self {
        Self {
            issue_id: issue_id.into(),
            depends_on_id: depends_on_id.into(),
        }
    }
}

/// The primary unit of work.
///
/// An issue with a `parent_issue_id` is a sub-issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Unique identifier
    pub id: IssueId,

    /// Owning project
    pub project_id: ProjectId,

    /// Owning epic
    pub epic_id: EpicId,

    /// Display number, unique within the project (`I-<number>`)
    pub number: u32,

    /// Issue title
    pub title: String,

    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Workflow status
    pub status: IssueStatus,

    /// Priority level (0 = highest, 3 = lowest)
    #[serde(default)]
    pub priority: u8,

    /// Optional Fibonacci estimate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_points: Option<StoryPoints>,

    /// Manual position among siblings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,

    /// Optional milestone label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<MilestoneId>,

    /// Parent issue, for sub-issues
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_issue_id: Option<IssueId>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Outgoing dependencies, resolved against the snapshot
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
}

impl Issue {
    /// Whether this issue is nested under another issue.
    #[must_use]
    pub fn is_sub_issue(&self) -> bool {
        self.parent_issue_id.is_some()
    }

    /// Story points as a plain number, 0 when unestimated.
    #[must_use]
    pub fn points(&self) -> u32 {
        self.story_points.map_or(0, StoryPoints::value)
    }
}

/// A global, cross-project label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// Unique identifier
    pub id: MilestoneId,

    /// Milestone name
    pub name: String,

    /// Optional due date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_wire_names() {
        for status in IssueStatus::ALL {
            assert_eq!(status.as_str().parse::<IssueStatus>().unwrap(), status);
        }
        assert_eq!(
            serde_json::to_string(&IssueStatus::InReview).unwrap(),
            "\"in_review\""
        );
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        assert!("blocked".parse::<IssueStatus>().is_err());
        assert!("Todo".parse::<IssueStatus>().is_err());
        assert!(serde_json::from_str::<IssueStatus>("\"open\"").is_err());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(IssueStatus::Done.is_terminal());
        assert!(IssueStatus::Canceled.is_terminal());
        assert!(!IssueStatus::Todo.is_terminal());
        assert!(!IssueStatus::Doing.is_terminal());
        assert!(!IssueStatus::InReview.is_terminal());
    }

    #[test]
    fn test_story_points_only_accept_fibonacci_values() {
        for value in StoryPoints::ALLOWED {
            assert_eq!(StoryPoints::try_from(value).unwrap().value(), u32::from(value));
        }
        for value in [0u8, 4, 6, 7, 20, 34] {
            assert!(StoryPoints::try_from(value).is_err(), "{value} accepted");
        }
    }

    #[test]
    fn test_story_points_deserialization_validates() {
        assert!(serde_json::from_str::<StoryPoints>("8").is_ok());
        assert!(serde_json::from_str::<StoryPoints>("4").is_err());
        assert!(serde_json::from_str::<StoryPoints>("-1").is_err());
    }

    #[test]
    fn test_ids_display_and_compare() {
        let id = IssueId::new("abc");
        assert_eq!(id.to_string(), "abc");
        assert_eq!(id, IssueId::from("abc"));
        assert_eq!(id.as_str(), "abc");
    }
}
