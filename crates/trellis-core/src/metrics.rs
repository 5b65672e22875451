//! Story point totals.
//!
//! Unlike [`crate::counts`], metrics ignore blocking state entirely.

use crate::domain::{Issue, IssueStatus};
use serde::{Deserialize, Serialize};

/// Issue and story point totals for a set of issues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetrics {
    /// Number of issues
    pub total_issues: usize,
    /// Points on `todo` and `doing` issues
    pub active_story_points: u32,
    /// Points on every estimated issue
    pub total_story_points: u32,
}

/// Sum story points over `issues`, skipping unestimated ones.
pub fn compute_project_metrics<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> ProjectMetrics {
    let mut metrics = ProjectMetrics::default();

    for issue in issues {
        metrics.total_issues += 1;

        let Some(points) = issue.story_points else {
            continue;
        };
        metrics.total_story_points += points.value();
        if matches!(issue.status, IssueStatus::Todo | IssueStatus::Doing) {
            metrics.active_story_points += points.value();
        }
    }

    metrics
}
