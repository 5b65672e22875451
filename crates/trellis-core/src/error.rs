//! Error types for field and relation validation.
//!
//! The computations in this crate never fail; these errors are produced only
//! by the validators and by parsing of domain values.

use crate::domain::{IssueId, ProjectId, MAX_PRIORITY, MAX_TITLE_LENGTH};
use thiserror::Error;

/// A domain value or relation that violates the model's invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Status string outside the five known statuses.
    #[error("Invalid status '{0}'. Expected one of: todo, doing, in_review, done, canceled")]
    InvalidStatus(String),

    /// Story points outside the Fibonacci set.
    #[error("Invalid story points {0}. Expected one of: 1, 2, 3, 5, 8, 13, 21")]
    InvalidStoryPoints(i64),

    /// Priority outside 0..=3.
    #[error("Invalid priority {0}. Must be between 0 and {MAX_PRIORITY}")]
    InvalidPriority(i64),

    /// Title is empty after trimming.
    #[error("Title cannot be empty")]
    EmptyTitle,

    /// Title exceeds the maximum length.
    #[error("Title cannot exceed {MAX_TITLE_LENGTH} characters, got {0} characters")]
    TitleTooLong(usize),

    /// Title contains a newline or control character.
    #[error("Title contains invalid character at position {0}")]
    InvalidTitleCharacter(usize),

    /// An issue was made its own parent.
    #[error("Issue {0} cannot be its own parent")]
    SelfParent(IssueId),

    /// Parent issue is itself a sub-issue.
    #[error("Issue {parent} is a sub-issue and cannot have sub-issues")]
    NestedSubIssue {
        /// The would-be parent
        parent: IssueId,
    },

    /// Sub-issue and parent live in different projects.
    #[error("Sub-issue {child} is in project {child_project} but its parent is in {parent_project}")]
    CrossProjectParent {
        /// The sub-issue
        child: IssueId,
        /// The sub-issue's project
        child_project: ProjectId,
        /// The parent's project
        parent_project: ProjectId,
    },
}
