//! In-memory snapshot of a tracker and the edits applied to it.
//!
//! A [`Snapshot`] holds flat entity lists plus the raw dependency relation.
//! Every view (trees, counts, ordering) is recomputed from it through
//! `trellis_core` after each change.

mod jsonl;

pub use jsonl::{load_snapshot, save_snapshot, LoadWarning};

use crate::error::SnapshotError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use trellis_core::domain::{
    AssemblyWarning, Dependency, DependencyEdge, DependencyTarget, Epic, EpicId, Issue, IssueId,
    Milestone, NodeId, Project, ProjectId, ProjectTree,
};
use trellis_core::reorder::SortUpdate;
use trellis_core::reparent::ReparentUpdate;

/// One line of the snapshot file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    /// A project row
    Project(Project),
    /// An epic row
    Epic(Epic),
    /// An issue or sub-issue row
    Issue(Issue),
    /// A milestone row
    Milestone(Milestone),
    /// A dependency edge
    Dependency(DependencyEdge),
}

/// Everything the tracker knows, held in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Projects, in file order
    pub projects: Vec<Project>,
    /// Epics, in file order
    pub epics: Vec<Epic>,
    /// Issues and sub-issues, in file order
    pub issues: Vec<Issue>,
    /// Milestones, in file order
    pub milestones: Vec<Milestone>,
    /// The dependency relation
    pub edges: Vec<DependencyEdge>,
}

impl Snapshot {
    /// Rebuild each issue's `dependencies` from `edges`.
    ///
    /// Targets missing from the snapshot stay unresolved.
    pub fn resolve_dependencies(&mut self) {
        let targets: HashMap<IssueId, DependencyTarget> = self
            .issues
            .iter()
            .map(|issue| (issue.id.clone(), DependencyTarget::from(issue)))
            .collect();

        let mut outgoing: HashMap<&IssueId, Vec<Dependency>> = HashMap::new();
        for edge in &self.edges {
            outgoing.entry(&edge.issue_id).or_default().push(Dependency {
                depends_on_id: edge.depends_on_id.clone(),
                target: targets.get(&edge.depends_on_id).cloned(),
            });
        }

        for issue in &mut self.issues {
            issue.dependencies = outgoing.remove(&issue.id).unwrap_or_default();
        }
    }

    /// Nest the snapshot into display-ordered project trees.
    ///
    /// Epics are ordered by sort order then number. Issues with a sort
    /// order come first, ascending, followed by the rest by number.
    /// Archived projects are left out.
    #[must_use]
    pub fn project_trees(&self) -> (Vec<ProjectTree>, Vec<AssemblyWarning>) {
        let archived: HashSet<&ProjectId> = self
            .projects
            .iter()
            .filter(|project| project.is_archived())
            .map(|project| &project.id)
            .collect();
        let live = |project_id: &ProjectId| !archived.contains(project_id);

        let projects: Vec<Project> = self
            .projects
            .iter()
            .filter(|project| live(&project.id))
            .cloned()
            .collect();

        let mut epics: Vec<Epic> = self
            .epics
            .iter()
            .filter(|epic| live(&epic.project_id))
            .cloned()
            .collect();
        epics.sort_by_key(|epic| (epic.sort_order, epic.number));

        let mut issues: Vec<Issue> = self
            .issues
            .iter()
            .filter(|issue| live(&issue.project_id))
            .cloned()
            .collect();
        issues.sort_by_key(|issue| (issue.sort_order.is_none(), issue.sort_order, issue.number));

        ProjectTree::assemble(&projects, &epics, &issues)
    }

    /// Look up a project by id.
    #[must_use]
    pub fn project(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.iter().find(|project| &project.id == id)
    }

    /// Look up an epic by id.
    #[must_use]
    pub fn epic(&self, id: &EpicId) -> Option<&Epic> {
        self.epics.iter().find(|epic| &epic.id == id)
    }

    /// Look up an issue by id.
    #[must_use]
    pub fn issue(&self, id: &IssueId) -> Option<&Issue> {
        self.issues.iter().find(|issue| &issue.id == id)
    }

    /// Issues belonging to `project`.
    pub fn issues_in_project<'a>(&'a self, project: &'a ProjectId) -> impl Iterator<Item = &'a Issue> {
        self.issues.iter().filter(move |issue| &issue.project_id == project)
    }

    /// Dependency edges whose endpoints both belong to `project`.
    #[must_use]
    pub fn edges_in_project(&self, project: &ProjectId) -> Vec<DependencyEdge> {
        let in_project = |id: &IssueId| self.issue(id).is_some_and(|issue| &issue.project_id == project);
        self.edges
            .iter()
            .filter(|edge| in_project(&edge.issue_id) && in_project(&edge.depends_on_id))
            .cloned()
            .collect()
    }

    /// Resolve a user-supplied reference to a node id.
    ///
    /// Accepts display numbers (`P-1`, `E-2`, `I-3`, case-insensitive) or
    /// raw entity ids. Epic and issue numbers are only unique within a
    /// project, so a number shared across projects is ambiguous.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::NotFound`] or [`SnapshotError::Ambiguous`].
    pub fn find_node_id(&self, reference: &str) -> Result<NodeId, SnapshotError> {
        let reference = reference.trim();

        if let Some((prefix, number)) = parse_display_number(reference) {
            let mut matches: Vec<NodeId> = match prefix {
                'P' => self
                    .projects
                    .iter()
                    .filter(|p| p.number == number)
                    .map(|p| NodeId::from(&p.id))
                    .collect(),
                'E' => self
                    .epics
                    .iter()
                    .filter(|e| e.number == number)
                    .map(|e| NodeId::from(&e.id))
                    .collect(),
                _ => self
                    .issues
                    .iter()
                    .filter(|i| i.number == number)
                    .map(|i| NodeId::from(&i.id))
                    .collect(),
            };
            return match matches.len() {
                0 => Err(SnapshotError::NotFound(reference.to_string())),
                1 => Ok(matches.remove(0)),
                count => Err(SnapshotError::Ambiguous {
                    reference: reference.to_string(),
                    count,
                }),
            };
        }

        let known = self.projects.iter().any(|p| p.id.as_str() == reference)
            || self.epics.iter().any(|e| e.id.as_str() == reference)
            || self.issues.iter().any(|i| i.id.as_str() == reference);
        if known {
            Ok(NodeId::new(reference))
        } else {
            Err(SnapshotError::NotFound(reference.to_string()))
        }
    }

    /// Resolve a reference that must name an issue.
    ///
    /// # Errors
    ///
    /// Fails like [`Snapshot::find_node_id`], or with
    /// [`SnapshotError::NotFound`] when the reference names a project or epic.
    pub fn find_issue(&self, reference: &str) -> Result<&Issue, SnapshotError> {
        let id = self.find_node_id(reference)?;
        self.issue(&IssueId::new(id.as_str()))
            .ok_or_else(|| SnapshotError::NotFound(format!("issue {reference}")))
    }

    /// Apply a validated reparent.
    ///
    /// Moving an epic carries its issues to the new project. Moving an
    /// issue carries its sub-issues to the new epic and project.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::NotFound`] when the id names no epic or issue.
    pub fn apply_reparent(&mut self, update: &ReparentUpdate) -> Result<(), SnapshotError> {
        let id = update.id.as_str();

        if let Some(epic) = self.epics.iter_mut().find(|epic| epic.id.as_str() == id) {
            epic.sort_order = update.new_sort_order;
            if let Some(project_id) = &update.new_project_id {
                epic.project_id = project_id.clone();

                // Sub-issues follow their parent even when their own epic is stale
                let moved: HashSet<IssueId> = self
                    .issues
                    .iter()
                    .filter(|issue| !issue.is_sub_issue() && issue.epic_id.as_str() == id)
                    .map(|issue| issue.id.clone())
                    .collect();
                for issue in self.issues.iter_mut().filter(|issue| {
                    issue.epic_id.as_str() == id
                        || issue.parent_issue_id.as_ref().is_some_and(|parent| moved.contains(parent))
                }) {
                    issue.project_id = project_id.clone();
                }
            }
            return Ok(());
        }

        let Some(issue) = self.issues.iter_mut().find(|issue| issue.id.as_str() == id) else {
            return Err(SnapshotError::NotFound(id.to_string()));
        };
        issue.sort_order = Some(update.new_sort_order);
        if let Some(epic_id) = &update.new_epic_id {
            issue.epic_id = epic_id.clone();
        }
        if let Some(project_id) = &update.new_project_id {
            issue.project_id = project_id.clone();
        }
        if update.new_parent_issue_id.is_some() {
            issue.parent_issue_id.clone_from(&update.new_parent_issue_id);
        }
        let (epic_id, project_id) = (issue.epic_id.clone(), issue.project_id.clone());

        for sub_issue in self
            .issues
            .iter_mut()
            .filter(|sub| sub.parent_issue_id.as_ref().is_some_and(|parent| parent.as_str() == id))
        {
            sub_issue.epic_id = epic_id.clone();
            sub_issue.project_id = project_id.clone();
        }

        Ok(())
    }

    /// Siblings of `issue` in display order: the other top-level issues of
    /// its epic, or the other sub-issues of its parent.
    #[must_use]
    pub fn siblings(&self, issue: &Issue) -> Vec<Issue> {
        let mut siblings: Vec<Issue> = self
            .issues
            .iter()
            .filter(|other| match &issue.parent_issue_id {
                Some(parent) => other.parent_issue_id.as_ref() == Some(parent),
                None => other.parent_issue_id.is_none() && other.epic_id == issue.epic_id,
            })
            .cloned()
            .collect();
        siblings.sort_by_key(|other| (other.sort_order.is_none(), other.sort_order, other.number));
        siblings
    }

    /// Apply new sort positions.
    pub fn apply_sort_updates(&mut self, updates: &[SortUpdate]) {
        for update in updates {
            if let Some(issue) = self.issues.iter_mut().find(|issue| issue.id == update.id) {
                issue.sort_order = Some(update.sort_order);
            }
        }
    }

    /// Every record, in the order they are written to disk.
    ///
    /// Edges are sorted so repeated saves produce identical files.
    #[must_use]
    pub fn records(&self) -> Vec<Record> {
        let mut edges = self.edges.clone();
        edges.sort();
        edges.dedup();

        self.projects
            .iter()
            .cloned()
            .map(Record::Project)
            .chain(self.milestones.iter().cloned().map(Record::Milestone))
            .chain(self.epics.iter().cloned().map(Record::Epic))
            .chain(self.issues.iter().cloned().map(|mut issue| {
                // The edge records are the source of truth.
                issue.dependencies.clear();
                Record::Issue(issue)
            }))
            .chain(edges.into_iter().map(Record::Dependency))
            .collect()
    }
}

/// Split `P-1`, `e-2` or `I-30` into its upper-cased prefix and number.
fn parse_display_number(reference: &str) -> Option<(char, u32)> {
    let (prefix, number) = reference.split_once('-')?;
    let prefix = match prefix {
        "P" | "p" => 'P',
        "E" | "e" => 'E',
        "I" | "i" => 'I',
        _ => return None,
    };
    number.parse().ok().map(|number| (prefix, number))
}
