//! JSONL persistence for snapshots.
//!
//! Each line of the file is one [`Record`]. Loading is resilient: a bad line
//! or an inconsistent row is skipped and reported as a [`LoadWarning`]
//! instead of failing the whole load.

use super::{Record, Snapshot};
use crate::error::{Result, SnapshotError};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use trellis_core::domain::{
    AssemblyWarning, EpicId, Issue, IssueId, MilestoneId, ProjectId, ProjectTree,
};
use trellis_core::graph::DependencyGraph;
use trellis_core::validation::{check_issue, validate_sub_issue_parent};
use trellis_core::ValidationError;

/// Non-fatal problems found while loading a snapshot.
///
/// The offending record is skipped; everything else still loads.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadWarning {
    /// A line that is not a valid record. Unknown statuses and disallowed
    /// story points land here too.
    MalformedJson {
        /// 1-based line number
        line_number: usize,
        /// Parser message
        error: String,
    },

    /// A second record reused an id; the first one wins.
    DuplicateId {
        /// 1-based line number of the duplicate
        line_number: usize,
        /// The repeated id
        id: String,
    },

    /// An issue failed field validation.
    InvalidIssueData {
        /// The issue
        issue_id: IssueId,
        /// 1-based line number
        line_number: usize,
        /// What was wrong
        error: ValidationError,
    },

    /// A sub-issue whose parent lives in another project.
    CrossProjectParent {
        /// The sub-issue
        issue_id: IssueId,
        /// Its parent
        parent_issue_id: IssueId,
    },

    /// A top-level issue whose epic belongs to another project.
    CrossProjectEpic {
        /// The issue
        issue_id: IssueId,
        /// Its epic
        epic_id: EpicId,
    },

    /// A dependency naming an issue that is not in the file.
    OrphanedDependency {
        /// Dependent issue
        from: IssueId,
        /// Missing or present target
        to: IssueId,
    },

    /// An issue depending on itself.
    SelfDependency {
        /// The issue
        issue_id: IssueId,
    },

    /// A dependency that would close a cycle.
    CircularDependency {
        /// Dependent issue
        from: IssueId,
        /// Target issue
        to: IssueId,
    },

    /// An epic or issue whose owner is missing.
    Orphaned(AssemblyWarning),
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedJson { line_number, error } => {
                write!(f, "line {line_number}: skipped malformed record: {error}")
            }
            Self::DuplicateId { line_number, id } => {
                write!(f, "line {line_number}: skipped duplicate id {id}")
            }
            Self::InvalidIssueData {
                issue_id,
                line_number,
                error,
            } => write!(f, "line {line_number}: skipped invalid issue {issue_id}: {error}"),
            Self::CrossProjectParent {
                issue_id,
                parent_issue_id,
            } => write!(
                f,
                "skipped sub-issue {issue_id}: parent {parent_issue_id} is in another project"
            ),
            Self::CrossProjectEpic { issue_id, epic_id } => write!(
                f,
                "skipped issue {issue_id}: epic {epic_id} is in another project"
            ),
            Self::OrphanedDependency { from, to } => {
                write!(f, "skipped dependency {from} -> {to}: issue not found")
            }
            Self::SelfDependency { issue_id } => {
                write!(f, "skipped dependency of {issue_id} on itself")
            }
            Self::CircularDependency { from, to } => {
                write!(f, "skipped dependency {from} -> {to}: would create a cycle")
            }
            Self::Orphaned(warning) => write!(f, "skipped {warning}"),
        }
    }
}

/// Ids seen so far, per entity kind.
#[derive(Default)]
struct SeenIds {
    projects: HashSet<ProjectId>,
    epics: HashSet<EpicId>,
    issues: HashSet<IssueId>,
    milestones: HashSet<MilestoneId>,
}

impl SeenIds {
    /// Record the id of `record`, returning it back when it was already seen.
    fn duplicate(&mut self, record: &Record) -> Option<String> {
        let fresh = match record {
            Record::Project(project) => self.projects.insert(project.id.clone()),
            Record::Epic(epic) => self.epics.insert(epic.id.clone()),
            Record::Issue(issue) => self.issues.insert(issue.id.clone()),
            Record::Milestone(milestone) => self.milestones.insert(milestone.id.clone()),
            Record::Dependency(_) => true,
        };
        if fresh {
            return None;
        }
        Some(match record {
            Record::Project(project) => project.id.to_string(),
            Record::Epic(epic) => epic.id.to_string(),
            Record::Issue(issue) => issue.id.to_string(),
            Record::Milestone(milestone) => milestone.id.to_string(),
            Record::Dependency(edge) => format!("{} -> {}", edge.issue_id, edge.depends_on_id),
        })
    }
}

/// Load a snapshot from a JSONL file.
///
/// A missing file loads as an empty snapshot. Loading runs in passes:
/// parse every line, validate issues and their parents, then add
/// dependency edges one at a time, rejecting any that would close a cycle.
/// Finally each issue's dependencies are resolved and the hierarchy is
/// checked for rows whose owner is missing.
///
/// # Errors
///
/// Fails only when the file exists but cannot be read.
pub async fn load_snapshot(path: &Path) -> Result<(Snapshot, Vec<LoadWarning>)> {
    let file = match File::open(path).await {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "Snapshot file missing, starting empty");
            return Ok((Snapshot::default(), Vec::new()));
        }
        Err(err) => return Err(err.into()),
    };

    let mut warnings = Vec::new();
    let mut snapshot = Snapshot::default();
    let mut seen = SeenIds::default();
    let mut issue_lines = Vec::new();
    let mut raw_edges = Vec::new();

    // First pass: parse records
    let mut lines = BufReader::new(file).lines();
    let mut line_number = 0;
    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }

        let record: Record = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(err) => {
                warnings.push(LoadWarning::MalformedJson {
                    line_number,
                    error: err.to_string(),
                });
                continue;
            }
        };

        if let Some(id) = seen.duplicate(&record) {
            warnings.push(LoadWarning::DuplicateId { line_number, id });
            continue;
        }

        match record {
            Record::Project(project) => snapshot.projects.push(project),
            Record::Epic(epic) => snapshot.epics.push(epic),
            Record::Milestone(milestone) => snapshot.milestones.push(milestone),
            Record::Issue(issue) => {
                issue_lines.push(line_number);
                snapshot.issues.push(issue);
            }
            Record::Dependency(edge) => raw_edges.push(edge),
        }
    }

    // Second pass: field validation, then parent relations
    let mut valid = Vec::with_capacity(snapshot.issues.len());
    for (issue, line_number) in snapshot.issues.drain(..).zip(issue_lines) {
        if let Some(error) = check_issue(&issue).into_iter().next() {
            warnings.push(LoadWarning::InvalidIssueData {
                issue_id: issue.id.clone(),
                line_number,
                error,
            });
            continue;
        }
        valid.push((issue, line_number));
    }

    let parents: HashMap<IssueId, Issue> = valid
        .iter()
        .map(|(issue, _)| (issue.id.clone(), issue.clone()))
        .collect();
    let epic_projects: HashMap<&EpicId, &ProjectId> = snapshot
        .epics
        .iter()
        .map(|epic| (&epic.id, &epic.project_id))
        .collect();
    let mut placed = Vec::with_capacity(valid.len());
    for (issue, line_number) in valid {
        if !issue.is_sub_issue()
            && epic_projects
                .get(&issue.epic_id)
                .is_some_and(|project_id| **project_id != issue.project_id)
        {
            warnings.push(LoadWarning::CrossProjectEpic {
                issue_id: issue.id.clone(),
                epic_id: issue.epic_id.clone(),
            });
            continue;
        }
        let parent = issue.parent_issue_id.as_ref().and_then(|id| parents.get(id));
        if let Some(parent) = parent {
            match validate_sub_issue_parent(&issue, parent) {
                Ok(()) => {}
                Err(ValidationError::CrossProjectParent { .. }) => {
                    warnings.push(LoadWarning::CrossProjectParent {
                        issue_id: issue.id.clone(),
                        parent_issue_id: parent.id.clone(),
                    });
                    continue;
                }
                Err(error) => {
                    warnings.push(LoadWarning::InvalidIssueData {
                        issue_id: issue.id.clone(),
                        line_number,
                        error,
                    });
                    continue;
                }
            }
        }
        placed.push(issue);
    }
    snapshot.issues = placed;

    // Third pass: dependency edges with cycle detection
    let known: HashSet<IssueId> = snapshot.issues.iter().map(|issue| issue.id.clone()).collect();
    let mut graph = DependencyGraph::new();
    let mut added = HashSet::new();
    for edge in raw_edges {
        if edge.issue_id == edge.depends_on_id {
            warnings.push(LoadWarning::SelfDependency {
                issue_id: edge.issue_id,
            });
            continue;
        }
        if !known.contains(&edge.issue_id) || !known.contains(&edge.depends_on_id) {
            warnings.push(LoadWarning::OrphanedDependency {
                from: edge.issue_id,
                to: edge.depends_on_id,
            });
            continue;
        }
        if added.contains(&edge) {
            continue;
        }
        if graph.would_create_cycle(&edge.issue_id, &edge.depends_on_id) {
            warnings.push(LoadWarning::CircularDependency {
                from: edge.issue_id,
                to: edge.depends_on_id,
            });
            continue;
        }
        graph.add_edge(&edge);
        added.insert(edge.clone());
        snapshot.edges.push(edge);
    }

    snapshot.resolve_dependencies();

    let (_, orphans) = ProjectTree::assemble(&snapshot.projects, &snapshot.epics, &snapshot.issues);
    warnings.extend(orphans.into_iter().map(LoadWarning::Orphaned));

    tracing::debug!(
        path = %path.display(),
        projects = snapshot.projects.len(),
        epics = snapshot.epics.len(),
        issues = snapshot.issues.len(),
        dependencies = snapshot.edges.len(),
        warnings = warnings.len(),
        "Loaded snapshot"
    );

    Ok((snapshot, warnings))
}

/// Save a snapshot to a JSONL file with an atomic write.
///
/// Records go to a temporary file next to `path`, which is then renamed
/// over it, so an interrupted save leaves the previous file intact.
///
/// # Errors
///
/// Fails when a record cannot be serialized or the file cannot be written.
pub async fn save_snapshot(snapshot: &Snapshot, path: &Path) -> Result<()> {
    let temp_path = path.with_extension("tmp");

    let file = File::create(&temp_path).await?;
    let mut writer = BufWriter::new(file);

    let records = snapshot.records();
    for record in &records {
        let json = serde_json::to_string(record).map_err(SnapshotError::from)?;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }

    writer.flush().await?;
    tokio::fs::rename(&temp_path, path).await?;

    tracing::debug!(path = %path.display(), records = records.len(), "Saved snapshot");
    Ok(())
}
