//! Nested project → epic → issue → sub-issue shapes.
//!
//! The flattener consumes these; [`ProjectTree::assemble`] builds them from
//! the flat rows a storage layer returns.

use super::{Epic, EpicId, Issue, IssueId, Project, ProjectId};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A project with its epics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectTree {
    /// The project itself
    pub project: Project,

    /// Epics in caller-supplied order
    pub epics: Vec<EpicTree>,
}

/// An epic with its top-level issues.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpicTree {
    /// The epic itself
    pub epic: Epic,

    /// Top-level issues (no parent issue)
    pub issues: Vec<IssueTree>,
}

/// A top-level issue with its sub-issues.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueTree {
    /// The issue itself
    pub issue: Issue,

    /// Direct sub-issues; no deeper nesting is modelled
    pub sub_issues: Vec<Issue>,
}

impl IssueTree {
    /// Iterate over the issue followed by its sub-issues.
    pub fn all_issues(&self) -> impl Iterator<Item = &Issue> {
        std::iter::once(&self.issue).chain(self.sub_issues.iter())
    }
}

/// A row left out while assembling trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyWarning {
    /// Epic references a project that is not in the snapshot. Its issues
    /// and their sub-issues are dropped with it and not reported again.
    OrphanedEpic {
        /// The epic
        epic_id: EpicId,
        /// The missing project
        project_id: ProjectId,
        /// Issues and sub-issues left out with the epic
        dropped_issues: usize,
    },

    /// Top-level issue references an epic that is not in the snapshot
    OrphanedIssue {
        /// The issue
        issue_id: IssueId,
        /// The missing epic
        epic_id: EpicId,
    },

    /// Sub-issue references a parent that is missing or is itself a sub-issue
    OrphanedSubIssue {
        /// The sub-issue
        issue_id: IssueId,
        /// The parent it points at
        parent_issue_id: IssueId,
    },
}

impl fmt::Display for AssemblyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OrphanedEpic {
                epic_id,
                project_id,
                dropped_issues,
            } => write!(
                f,
                "epic {epic_id} references missing project {project_id} \
                 ({dropped_issues} issues dropped with it)"
            ),
            Self::OrphanedIssue { issue_id, epic_id } => {
                write!(f, "issue {issue_id} references missing epic {epic_id}")
            }
            Self::OrphanedSubIssue {
                issue_id,
                parent_issue_id,
            } => write!(
                f,
                "sub-issue {issue_id} references missing or nested parent {parent_issue_id}"
            ),
        }
    }
}

impl ProjectTree {
    /// Iterate over every issue and sub-issue in the project.
    pub fn all_issues(&self) -> impl Iterator<Item = &Issue> {
        self.epics
            .iter()
            .flat_map(|epic| epic.issues.iter())
            .flat_map(IssueTree::all_issues)
    }

    /// Iterate over the top-level issues of every epic.
    pub fn top_level_issues(&self) -> impl Iterator<Item = &Issue> {
        self.epics
            .iter()
            .flat_map(|epic| epic.issues.iter())
            .map(|tree| &tree.issue)
    }

    /// Nest flat rows into project trees.
    ///
    /// Input order is preserved at every level. Sub-issues are grouped under
    /// their parent issue even when their own `epic_id` has gone stale.
    /// Rows whose owner is missing are skipped and reported.
    #[must_use]
    pub fn assemble(
        projects: &[Project],
        epics: &[Epic],
        issues: &[Issue],
    ) -> (Vec<ProjectTree>, Vec<AssemblyWarning>) {
        let mut warnings = Vec::new();

        let project_ids: HashSet<&ProjectId> = projects.iter().map(|p| &p.id).collect();
        let epic_ids: HashSet<&EpicId> = epics.iter().map(|e| &e.id).collect();
        let top_level_ids: HashSet<&IssueId> = issues
            .iter()
            .filter(|i| !i.is_sub_issue() && epic_ids.contains(&i.epic_id))
            .map(|i| &i.id)
            .collect();

        let mut sub_issues: HashMap<&IssueId, Vec<Issue>> = HashMap::new();
        let mut top_level: HashMap<&EpicId, Vec<&Issue>> = HashMap::new();
        for issue in issues {
            match &issue.parent_issue_id {
                Some(parent) if top_level_ids.contains(parent) => {
                    sub_issues.entry(parent).or_default().push(issue.clone());
                }
                Some(parent) => warnings.push(AssemblyWarning::OrphanedSubIssue {
                    issue_id: issue.id.clone(),
                    parent_issue_id: parent.clone(),
                }),
                None if epic_ids.contains(&issue.epic_id) => {
                    top_level.entry(&issue.epic_id).or_default().push(issue);
                }
                None => warnings.push(AssemblyWarning::OrphanedIssue {
                    issue_id: issue.id.clone(),
                    epic_id: issue.epic_id.clone(),
                }),
            }
        }

        let mut by_project: HashMap<&ProjectId, Vec<EpicTree>> = HashMap::new();
        for epic in epics {
            if !project_ids.contains(&epic.project_id) {
                let dropped_issues = top_level
                    .remove(&epic.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|issue| 1 + sub_issues.remove(&issue.id).map_or(0, |subs| subs.len()))
                    .sum();
                warnings.push(AssemblyWarning::OrphanedEpic {
                    epic_id: epic.id.clone(),
                    project_id: epic.project_id.clone(),
                    dropped_issues,
                });
                continue;
            }
            let issues = top_level
                .remove(&epic.id)
                .unwrap_or_default()
                .into_iter()
                .map(|issue| IssueTree {
                    issue: issue.clone(),
                    sub_issues: sub_issues.remove(&issue.id).unwrap_or_default(),
                })
                .collect();
            by_project.entry(&epic.project_id).or_default().push(EpicTree {
                epic: epic.clone(),
                issues,
            });
        }

        for warning in &warnings {
            tracing::debug!(%warning, "Skipped row while assembling project trees");
        }

        let trees = projects
            .iter()
            .map(|project| ProjectTree {
                project: project.clone(),
                epics: by_project.remove(&project.id).unwrap_or_default(),
            })
            .collect();

        (trees, warnings)
    }
}
