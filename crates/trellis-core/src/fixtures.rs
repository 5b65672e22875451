//! Entity builders shared by the unit tests.

use crate::domain::{
    Dependency, DependencyTarget, Epic, EpicId, EpicTree, Issue, IssueId, IssueStatus, IssueTree,
    LifecycleStatus, Project, ProjectId, ProjectTree, StoryPoints,
};
use chrono::{DateTime, Utc};

fn timestamp() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

pub(crate) fn project(id: &str) -> Project {
    Project {
        id: ProjectId::new(id),
        number: 1,
        name: format!("Project {id}"),
        description: None,
        created_at: timestamp(),
        archived_at: None,
        status: LifecycleStatus::Active,
    }
}

pub(crate) fn epic(id: &str, project_id: &str) -> Epic {
    Epic {
        id: EpicId::new(id),
        project_id: ProjectId::new(project_id),
        number: 1,
        name: format!("Epic {id}"),
        description: None,
        status: LifecycleStatus::Active,
        is_default: false,
        sort_order: 0,
        milestone_id: None,
    }
}

pub(crate) fn issue(id: &str, epic_id: &str) -> Issue {
    Issue {
        id: IssueId::new(id),
        project_id: ProjectId::new("p1"),
        epic_id: EpicId::new(epic_id),
        number: 1,
        title: format!("Issue {id}"),
        description: None,
        status: IssueStatus::Todo,
        priority: 2,
        story_points: None,
        sort_order: None,
        milestone_id: None,
        parent_issue_id: None,
        created_at: timestamp(),
        dependencies: vec![],
    }
}

pub(crate) fn sub_issue(id: &str, parent_id: &str) -> Issue {
    Issue {
        parent_issue_id: Some(IssueId::new(parent_id)),
        ..issue(id, "e1")
    }
}

pub(crate) fn with_status(mut issue: Issue, status: IssueStatus) -> Issue {
    issue.status = status;
    issue
}

pub(crate) fn with_points(mut issue: Issue, points: u8) -> Issue {
    issue.story_points = Some(StoryPoints::try_from(points).unwrap());
    issue
}

/// Add a resolved dependency on a target with the given status.
pub(crate) fn depending_on(mut issue: Issue, target_id: &str, status: IssueStatus) -> Issue {
    issue.dependencies.push(Dependency {
        depends_on_id: IssueId::new(target_id),
        target: Some(DependencyTarget {
            id: IssueId::new(target_id),
            number: 99,
            title: format!("Issue {target_id}"),
            status,
        }),
    });
    issue
}

/// Add a dependency whose target was not loaded.
pub(crate) fn depending_on_unresolved(mut issue: Issue, target_id: &str) -> Issue {
    issue.dependencies.push(Dependency {
        depends_on_id: IssueId::new(target_id),
        target: None,
    });
    issue
}

/// p1
/// ├── e1
/// │   ├── i1 (3 pts, done)
/// │   │   └── s1 (2 pts)
/// │   └── i2 (5 pts, blocked)
/// └── e2
/// p2
pub(crate) fn sample_tree() -> Vec<ProjectTree> {
    vec![
        ProjectTree {
            project: project("p1"),
            epics: vec![
                EpicTree {
                    epic: epic("e1", "p1"),
                    issues: vec![
                        IssueTree {
                            issue: with_status(with_points(issue("i1", "e1"), 3), IssueStatus::Done),
                            sub_issues: vec![with_points(sub_issue("s1", "i1"), 2)],
                        },
                        IssueTree {
                            issue: depending_on(
                                with_points(issue("i2", "e1"), 5),
                                "i9",
                                IssueStatus::Todo,
                            ),
                            sub_issues: vec![],
                        },
                    ],
                },
                EpicTree {
                    epic: epic("e2", "p1"),
                    issues: vec![],
                },
            ],
        },
        ProjectTree {
            project: project("p2"),
            epics: vec![],
        },
    ]
}
