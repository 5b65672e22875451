//! Blocked/ready classification and status transitions.
//!
//! A dependency blocks its issue until the target reaches a terminal status
//! (`done` or `canceled`). Targets the storage layer did not resolve never
//! block.

use crate::domain::{DependencyTarget, Issue, IssueStatus};

/// Whether any resolved dependency target is still open.
#[must_use]
pub fn is_blocked(issue: &Issue) -> bool {
    resolved_targets(issue).any(|target| !target.status.is_terminal())
}

/// A `todo` issue with nothing blocking it.
#[must_use]
pub fn is_ready(issue: &Issue) -> bool {
    issue.status == IssueStatus::Todo && !is_blocked(issue)
}

/// Whether the issue itself is `done` or `canceled`.
#[must_use]
pub fn is_terminal(issue: &Issue) -> bool {
    issue.status.is_terminal()
}

/// Dependency targets that still block the issue, in dependency order.
#[must_use]
pub fn blocking_dependencies(issue: &Issue) -> Vec<&DependencyTarget> {
    resolved_targets(issue)
        .filter(|target| !target.status.is_terminal())
        .collect()
}

/// Dependency targets that have reached a terminal status.
#[must_use]
pub fn satisfied_dependencies(issue: &Issue) -> Vec<&DependencyTarget> {
    resolved_targets(issue)
        .filter(|target| target.status.is_terminal())
        .collect()
}

fn resolved_targets(issue: &Issue) -> impl Iterator<Item = &DependencyTarget> {
    issue
        .dependencies
        .iter()
        .filter_map(|dependency| dependency.target.as_ref())
}

/// Statuses reachable from `status` in one step.
///
/// `done` is final; `canceled` can only be reopened to `todo`.
#[must_use]
pub fn allowed_transitions(status: IssueStatus) -> &'static [IssueStatus] {
    use IssueStatus::{Canceled, Doing, Done, InReview, Todo};

    match status {
        Todo => &[Doing, Canceled],
        Doing => &[InReview, Todo, Canceled],
        InReview => &[Done, Doing, Canceled],
        Done => &[],
        Canceled => &[Todo],
    }
}

/// Like [`allowed_transitions`], for a raw status string.
///
/// Unknown statuses have no transitions.
#[must_use]
pub fn allowed_transitions_str(status: &str) -> &'static [IssueStatus] {
    match status.parse::<IssueStatus>() {
        Ok(status) => allowed_transitions(status),
        Err(_) => &[],
    }
}

/// Whether `from -> to` is a permitted single-step transition.
#[must_use]
pub fn can_transition(from: IssueStatus, to: IssueStatus) -> bool {
    allowed_transitions(from).contains(&to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{depending_on, depending_on_unresolved, issue, with_status};
    use rstest::rstest;

    #[test]
    fn test_issue_without_dependencies_is_never_blocked() {
        let issue = issue("i1", "e1");
        assert!(!is_blocked(&issue));
        assert!(is_ready(&issue));
    }

    #[rstest]
    #[case(IssueStatus::Todo, true)]
    #[case(IssueStatus::Doing, true)]
    #[case(IssueStatus::InReview, true)]
    #[case(IssueStatus::Done, false)]
    #[case(IssueStatus::Canceled, false)]
    fn test_blocked_by_target_status(#[case] target: IssueStatus, #[case] blocked: bool) {
        let issue = depending_on(issue("i1", "e1"), "i2", target);
        assert_eq!(is_blocked(&issue), blocked);
        assert_eq!(is_ready(&issue), !blocked);
    }

    #[test]
    fn test_unresolved_target_does_not_block() {
        let issue = depending_on_unresolved(issue("i1", "e1"), "ghost");
        assert!(!is_blocked(&issue));
        assert!(blocking_dependencies(&issue).is_empty());
        assert!(satisfied_dependencies(&issue).is_empty());
    }

    #[test]
    fn test_one_open_target_among_many_blocks() {
        let issue = depending_on(issue("i1", "e1"), "a", IssueStatus::Done);
        let issue = depending_on(issue, "b", IssueStatus::Doing);
        let issue = depending_on(issue, "c", IssueStatus::Canceled);
        assert!(is_blocked(&issue));
    }

    #[test]
    fn test_ready_requires_todo() {
        let issue = with_status(issue("i1", "e1"), IssueStatus::Doing);
        assert!(!is_blocked(&issue));
        assert!(!is_ready(&issue));
    }

    #[test]
    fn test_blocking_and_satisfied_preserve_order() {
        let issue = depending_on(issue("i1", "e1"), "a", IssueStatus::Todo);
        let issue = depending_on(issue, "b", IssueStatus::Done);
        let issue = depending_on_unresolved(issue, "ghost");
        let issue = depending_on(issue, "c", IssueStatus::InReview);
        let issue = depending_on(issue, "d", IssueStatus::Canceled);

        let blocking: Vec<&str> = blocking_dependencies(&issue)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        let satisfied: Vec<&str> = satisfied_dependencies(&issue)
            .iter()
            .map(|t| t.id.as_str())
            .collect();

        assert_eq!(blocking, vec!["a", "c"]);
        assert_eq!(satisfied, vec!["b", "d"]);
    }

    #[test]
    fn test_terminal() {
        assert!(is_terminal(&with_status(issue("i", "e"), IssueStatus::Done)));
        assert!(is_terminal(&with_status(issue("i", "e"), IssueStatus::Canceled)));
        assert!(!is_terminal(&issue("i", "e")));
    }

    #[test]
    fn test_transition_table() {
        use IssueStatus::{Canceled, Doing, Done, InReview, Todo};

        assert_eq!(allowed_transitions(Todo), &[Doing, Canceled]);
        assert_eq!(allowed_transitions(Doing), &[InReview, Todo, Canceled]);
        assert_eq!(allowed_transitions(InReview), &[Done, Doing, Canceled]);
        assert!(allowed_transitions(Done).is_empty());
        assert_eq!(allowed_transitions(Canceled), &[Todo]);
    }

    #[rstest]
    #[case("in_review", 3)]
    #[case("done", 0)]
    #[case("blocked", 0)]
    #[case("", 0)]
    fn test_transitions_from_string(#[case] status: &str, #[case] count: usize) {
        assert_eq!(allowed_transitions_str(status).len(), count);
    }

    #[test]
    fn test_can_transition() {
        assert!(can_transition(IssueStatus::Todo, IssueStatus::Doing));
        assert!(!can_transition(IssueStatus::Todo, IssueStatus::Done));
        assert!(!can_transition(IssueStatus::Done, IssueStatus::Todo));
        assert!(can_transition(IssueStatus::Canceled, IssueStatus::Todo));
    }
}
