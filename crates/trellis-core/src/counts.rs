//! Per-state issue counts and completion progress.

use crate::domain::{Issue, IssueStatus};
use crate::status::is_blocked;
use serde::{Deserialize, Serialize};

/// Issues bucketed into six mutually exclusive states.
///
/// `blocked` takes precedence over every status bucket: a blocked `doing`
/// issue is counted only as blocked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCounts {
    /// `todo` and unblocked
    pub ready: usize,
    /// Has an open dependency
    pub blocked: usize,
    /// `doing` and unblocked
    pub doing: usize,
    /// `in_review` and unblocked
    pub in_review: usize,
    /// `done` and unblocked
    pub done: usize,
    /// `canceled` and unblocked
    pub canceled: usize,
}

impl IssueCounts {
    /// Sum of all six buckets.
    #[must_use]
    pub fn total(&self) -> usize {
        self.ready + self.blocked + self.doing + self.in_review + self.done + self.canceled
    }
}

/// Completed vs total, with a rounded percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Completed units (issues or story points)
    pub completed: u64,
    /// Total units
    pub total: u64,
    /// `round(100 * completed / total)`, 0 when total is 0
    pub percentage: u8,
}

impl Progress {
    /// Build a progress value, deriving the percentage.
    #[must_use]
    pub fn new(completed: u64, total: u64) -> Self {
        Self {
            completed,
            total,
            percentage: percentage(completed, total),
        }
    }
}

/// Bucket issues by state.
pub fn compute_issue_counts<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> IssueCounts {
    let mut counts = IssueCounts::default();

    for issue in issues {
        if is_blocked(issue) {
            counts.blocked += 1;
            continue;
        }

        match issue.status {
            IssueStatus::Todo => counts.ready += 1,
            IssueStatus::Doing => counts.doing += 1,
            IssueStatus::InReview => counts.in_review += 1,
            IssueStatus::Done => counts.done += 1,
            IssueStatus::Canceled => counts.canceled += 1,
        }
    }

    counts
}

/// Issue-count progress: `done + canceled` out of every bucket.
#[must_use]
pub fn compute_progress(counts: &IssueCounts) -> Progress {
    let completed = counts.done + counts.canceled;
    Progress::new(completed as u64, counts.total() as u64)
}

/// `100 * completed / total` rounded half-up, or 0 for an empty total.
#[must_use]
pub fn percentage(completed: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let rounded = (200 * completed + total) / (2 * total);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{depending_on, issue, with_status};
    use rstest::rstest;

    fn counts(ready: usize, done: usize, canceled: usize) -> IssueCounts {
        IssueCounts {
            ready,
            done,
            canceled,
            ..IssueCounts::default()
        }
    }

    #[test]
    fn test_each_status_lands_in_its_bucket() {
        let issues: Vec<Issue> = IssueStatus::ALL
            .into_iter()
            .map(|status| with_status(issue("i", "e"), status))
            .collect();

        let counts = compute_issue_counts(&issues);

        assert_eq!(
            counts,
            IssueCounts {
                ready: 1,
                blocked: 0,
                doing: 1,
                in_review: 1,
                done: 1,
                canceled: 1,
            }
        );
    }

    #[test]
    fn test_blocked_doing_issue_counts_only_as_blocked() {
        let issue = depending_on(
            with_status(issue("i1", "e1"), IssueStatus::Doing),
            "i2",
            IssueStatus::Todo,
        );

        let counts = compute_issue_counts([&issue]);

        assert_eq!(counts.blocked, 1);
        assert_eq!(counts.doing, 0);
        assert_eq!(counts.total(), 1);
    }

    #[test]
    fn test_blocked_done_issue_counts_only_as_blocked() {
        let issue = depending_on(
            with_status(issue("i1", "e1"), IssueStatus::Done),
            "i2",
            IssueStatus::Doing,
        );

        let counts = compute_issue_counts([&issue]);

        assert_eq!(counts.blocked, 1);
        assert_eq!(counts.done, 0);
    }

    #[test]
    fn test_empty_input() {
        let counts = compute_issue_counts(std::iter::empty());
        assert_eq!(counts, IssueCounts::default());
        assert_eq!(compute_progress(&counts), Progress::default());
    }

    #[test]
    fn test_progress_all_terminal() {
        let progress = compute_progress(&counts(0, 3, 2));
        assert_eq!(
            progress,
            Progress {
                completed: 5,
                total: 5,
                percentage: 100
            }
        );
    }

    #[test]
    fn test_progress_rounds_down_a_third() {
        let progress = compute_progress(&counts(2, 1, 0));
        assert_eq!(
            progress,
            Progress {
                completed: 1,
                total: 3,
                percentage: 33
            }
        );
    }

    #[test]
    fn test_blocked_counts_toward_total_not_completed() {
        let counts = IssueCounts {
            blocked: 1,
            done: 1,
            ..IssueCounts::default()
        };
        assert_eq!(compute_progress(&counts).percentage, 50);
    }

    #[rstest]
    #[case(0, 0, 0)]
    #[case(1, 3, 33)]
    #[case(2, 3, 67)]
    #[case(1, 8, 13)]
    #[case(1, 200, 1)]
    #[case(1, 201, 0)]
    #[case(5, 5, 100)]
    fn test_percentage_rounds_half_up(
        #[case] completed: u64,
        #[case] total: u64,
        #[case] expected: u8,
    ) {
        assert_eq!(percentage(completed, total), expected);
    }

    #[test]
    fn test_counts_serialize_camel_case() {
        let json = serde_json::to_value(IssueCounts::default()).unwrap();
        assert!(json.get("inReview").is_some());
    }
}
