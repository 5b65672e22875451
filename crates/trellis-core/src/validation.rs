//! Field-level validators.
//!
//! Predicates return `bool` so callers can decide whether to reject input
//! upstream. The `validate_*` functions return a [`ValidationError`]
//! describing the first problem found.

use crate::domain::{Issue, IssueStatus, StoryPoints, MAX_PRIORITY, MAX_TITLE_LENGTH, MIN_PRIORITY};
use crate::error::ValidationError;

/// Accepts `None` and exactly the Fibonacci values 1, 2, 3, 5, 8, 13, 21.
#[must_use]
pub fn is_valid_story_points(points: Option<i64>) -> bool {
    parse_story_points(points).is_ok()
}

/// Convert a raw estimate into the typed form.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidStoryPoints`] for any value outside the
/// allowed set, including 0 and negative numbers.
pub fn parse_story_points(points: Option<i64>) -> Result<Option<StoryPoints>, ValidationError> {
    let Some(value) = points else {
        return Ok(None);
    };
    u8::try_from(value)
        .map_err(|_| ValidationError::InvalidStoryPoints(value))
        .and_then(StoryPoints::try_from)
        .map(Some)
}

/// Whether `status` is one of the five known statuses.
#[must_use]
pub fn is_valid_status(status: &str) -> bool {
    status.parse::<IssueStatus>().is_ok()
}

/// Whether `priority` is within 0..=3.
#[must_use]
pub fn is_valid_priority(priority: i64) -> bool {
    (i64::from(MIN_PRIORITY)..=i64::from(MAX_PRIORITY)).contains(&priority)
}

/// Validate and trim an issue title.
///
/// # Errors
///
/// Rejects empty titles, titles longer than [`MAX_TITLE_LENGTH`]
/// characters, and titles containing newlines or control characters
/// (tab excepted).
pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    let title = title.trim();

    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }

    let length = title.chars().count();
    if length > MAX_TITLE_LENGTH {
        return Err(ValidationError::TitleTooLong(length));
    }

    if let Some(position) = title.chars().position(|c| c != '\t' && c.is_control()) {
        return Err(ValidationError::InvalidTitleCharacter(position));
    }

    Ok(title.to_string())
}

/// Check that `parent` can hold `child` as a sub-issue.
///
/// # Errors
///
/// Fails when the issue would parent itself, when the parent is already a
/// sub-issue, or when the two live in different projects.
pub fn validate_sub_issue_parent(child: &Issue, parent: &Issue) -> Result<(), ValidationError> {
    if child.id == parent.id {
        return Err(ValidationError::SelfParent(child.id.clone()));
    }
    if parent.is_sub_issue() {
        return Err(ValidationError::NestedSubIssue {
            parent: parent.id.clone(),
        });
    }
    if child.project_id != parent.project_id {
        return Err(ValidationError::CrossProjectParent {
            child: child.id.clone(),
            child_project: child.project_id.clone(),
            parent_project: parent.project_id.clone(),
        });
    }
    Ok(())
}

/// Every field-level problem with `issue`.
#[must_use]
pub fn check_issue(issue: &Issue) -> Vec<ValidationError> {
    let mut problems = Vec::new();

    if !is_valid_priority(i64::from(issue.priority)) {
        problems.push(ValidationError::InvalidPriority(i64::from(issue.priority)));
    }
    if let Err(error) = validate_title(&issue.title) {
        problems.push(error);
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProjectId;
    use crate::fixtures::{issue, sub_issue};
    use rstest::rstest;

    #[rstest]
    #[case(None)]
    #[case(Some(1))]
    #[case(Some(2))]
    #[case(Some(3))]
    #[case(Some(5))]
    #[case(Some(8))]
    #[case(Some(13))]
    #[case(Some(21))]
    fn test_valid_story_points(#[case] points: Option<i64>) {
        assert!(is_valid_story_points(points));
    }

    #[rstest]
    #[case(0)]
    #[case(4)]
    #[case(-1)]
    #[case(-8)]
    #[case(34)]
    #[case(256 + 5)]
    fn test_invalid_story_points(#[case] points: i64) {
        assert!(!is_valid_story_points(Some(points)));
        assert_eq!(
            parse_story_points(Some(points)),
            Err(ValidationError::InvalidStoryPoints(points))
        );
    }

    #[test]
    fn test_status_membership() {
        for status in ["todo", "doing", "in_review", "done", "canceled"] {
            assert!(is_valid_status(status), "{status}");
        }
        for status in ["open", "closed", "in-review", "DONE", ""] {
            assert!(!is_valid_status(status), "{status}");
        }
    }

    #[test]
    fn test_priority_range() {
        assert!(is_valid_priority(0));
        assert!(is_valid_priority(3));
        assert!(!is_valid_priority(4));
        assert!(!is_valid_priority(-1));
    }

    #[rstest]
    #[case("  Fix login  ", Ok("Fix login".to_string()))]
    #[case("   ", Err(ValidationError::EmptyTitle))]
    #[case("line\nbreak", Err(ValidationError::InvalidTitleCharacter(4)))]
    #[case("bell\u{7}", Err(ValidationError::InvalidTitleCharacter(4)))]
    #[case("tab\tok", Ok("tab\tok".to_string()))]
    fn test_validate_title(#[case] input: &str, #[case] expected: Result<String, ValidationError>) {
        assert_eq!(validate_title(input), expected);
    }

    #[test]
    fn test_title_length_counts_characters() {
        let at_limit = "é".repeat(MAX_TITLE_LENGTH);
        assert!(validate_title(&at_limit).is_ok());

        let too_long = "a".repeat(MAX_TITLE_LENGTH + 1);
        assert_eq!(
            validate_title(&too_long),
            Err(ValidationError::TitleTooLong(MAX_TITLE_LENGTH + 1))
        );
    }

    #[test]
    fn test_sub_issue_parent_rules() {
        let parent = issue("i1", "e1");
        let child = sub_issue("s1", "i1");
        assert!(validate_sub_issue_parent(&child, &parent).is_ok());

        assert!(matches!(
            validate_sub_issue_parent(&parent, &parent),
            Err(ValidationError::SelfParent(_))
        ));

        let grandchild = sub_issue("g1", "s1");
        assert!(matches!(
            validate_sub_issue_parent(&grandchild, &child),
            Err(ValidationError::NestedSubIssue { .. })
        ));

        let mut foreign = sub_issue("s2", "i1");
        foreign.project_id = ProjectId::new("p2");
        assert!(matches!(
            validate_sub_issue_parent(&foreign, &parent),
            Err(ValidationError::CrossProjectParent { .. })
        ));
    }

    #[test]
    fn test_check_issue_collects_problems() {
        assert!(check_issue(&issue("i1", "e1")).is_empty());

        let mut bad = issue("i1", "e1");
        bad.priority = 7;
        bad.title = String::new();
        assert_eq!(
            check_issue(&bad),
            vec![ValidationError::InvalidPriority(7), ValidationError::EmptyTitle]
        );
    }
}
