//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands.

use anyhow::Result;
use chrono::Utc;
use std::collections::HashSet;

use super::args::{
    BlockedArgs, CheckArgs, DepsArgs, InitArgs, MoveArgs, OrderArgs, ReadyArgs, ReorderArgs,
    StatsArgs, TransitionsArgs, TreeArgs,
};
use super::types::MoveDirection;
use crate::app::App;
use crate::error::{Error, SnapshotError};
use crate::output::{
    self, BlockedRow, CheckReport, DepsReport, IssueProblem, IssueRow, OutputConfig, OutputMode,
    ProjectStats,
};
use trellis_core::counts::{compute_issue_counts, compute_progress};
use trellis_core::domain::{DependencyTarget, Issue, IssueId, IssueStatus, NodeId, ProjectId};
use trellis_core::format::{display_number, format_date, format_due_date, format_file_size};
use trellis_core::graph::{blocked_issues, topological_sort, transitive_dependencies, DependencyGraph};
use trellis_core::hierarchy::{visible_nodes, ChildIndex, NodeKind};
use trellis_core::metrics::compute_project_metrics;
use trellis_core::reorder::{move_down, move_up, new_sort_orders};
use trellis_core::reparent::{can_reparent, reparent_updates};
use trellis_core::status::{allowed_transitions_str, blocking_dependencies, is_blocked, is_ready};
use trellis_core::validation::check_issue;

fn output_config(app: &App) -> OutputConfig {
    OutputConfig::from_settings(&app.config().output)
}

/// Resolve an optional project reference.
fn project_filter(app: &App, reference: Option<&str>) -> Result<Option<ProjectId>> {
    let Some(reference) = reference else {
        return Ok(None);
    };
    let id = app.snapshot().find_node_id(reference)?;
    let project_id = ProjectId::new(id.as_str());
    if app.snapshot().project(&project_id).is_none() {
        anyhow::bail!("'{reference}' is not a project");
    }
    Ok(Some(project_id))
}

/// Issues of non-archived projects, optionally limited to one project.
fn active_issues<'a>(app: &'a App, project: Option<&ProjectId>) -> Vec<&'a Issue> {
    let snapshot = app.snapshot();
    snapshot
        .issues
        .iter()
        .filter(|issue| project.is_none_or(|project| &issue.project_id == project))
        .filter(|issue| {
            snapshot
                .project(&issue.project_id)
                .is_some_and(|project| !project.is_archived())
        })
        .collect()
}

/// Execute the init command
pub async fn execute_init(args: &InitArgs) -> Result<()> {
    use crate::config;

    let current_dir = std::env::current_dir()?;

    if !args.quiet {
        println!("Initializing trellis repository...");
    }

    let result = config::init(&current_dir).await?;

    if !args.quiet {
        let config = OutputConfig::default();
        println!(
            "Initialized trellis in {}",
            output::info(&result.trellis_dir.display().to_string(), &config)
        );
        println!("  Config:   {}", result.config_file.display());
        println!("  Snapshot: {}", result.snapshot_file.display());
    }

    Ok(())
}

/// Execute the tree command
pub fn execute_tree(app: &App, args: &TreeArgs, output_mode: OutputMode) -> Result<()> {
    let nodes = app.tree();

    let expanded: HashSet<NodeId> = if args.all {
        nodes.iter().map(|node| node.id.clone()).collect()
    } else {
        args.expand
            .iter()
            .map(|reference| app.snapshot().find_node_id(reference))
            .collect::<std::result::Result<_, _>>()?
    };

    let visible = visible_nodes(&nodes, &expanded);
    tracing::debug!(
        total = nodes.len(),
        visible = visible.len(),
        "Rendering hierarchy"
    );

    if visible.is_empty() && output_mode == OutputMode::Text {
        output::print_message("No projects.")?;
        return Ok(());
    }

    output::print_tree(&visible, output_mode, &output_config(app))?;
    Ok(())
}

/// Execute the ready command
pub fn execute_ready(app: &App, args: &ReadyArgs, output_mode: OutputMode) -> Result<()> {
    let project = project_filter(app, args.project.as_deref())?;
    let today = Utc::now().date_naive();

    let mut ready: Vec<&Issue> = active_issues(app, project.as_ref())
        .into_iter()
        .filter(|issue| is_ready(issue))
        .collect();
    ready.sort_by_key(|issue| (issue.priority, issue.created_at, issue.number));
    if let Some(limit) = args.limit {
        ready.truncate(limit);
    }

    let rows: Vec<IssueRow<'_>> = ready
        .into_iter()
        .map(|issue| {
            let due = issue
                .milestone_id
                .as_ref()
                .and_then(|id| app.snapshot().milestones.iter().find(|m| &m.id == id))
                .and_then(|milestone| milestone.due_date)
                .map(|date| format_due_date(date, today));
            IssueRow {
                display_number: output::issue_number(issue),
                issue,
                blocked: false,
                due,
            }
        })
        .collect();

    output::print_issues("Ready issues", &rows, output_mode, &output_config(app))?;
    Ok(())
}

/// Execute the blocked command
pub fn execute_blocked(app: &App, args: &BlockedArgs, output_mode: OutputMode) -> Result<()> {
    let project = project_filter(app, args.project.as_deref())?;

    let rows: Vec<BlockedRow<'_>> = active_issues(app, project.as_ref())
        .into_iter()
        .filter(|issue| is_blocked(issue))
        .map(|issue| BlockedRow {
            display_number: output::issue_number(issue),
            issue,
            blockers: blocking_dependencies(issue),
        })
        .collect();

    output::print_blocked(&rows, output_mode, &output_config(app))?;
    Ok(())
}

/// Execute the stats command
pub fn execute_stats(app: &App, args: &StatsArgs, output_mode: OutputMode) -> Result<()> {
    let project_id = project_filter(app, args.project.as_deref())?;
    let snapshot = app.snapshot();

    let stats: Vec<ProjectStats> = snapshot
        .projects
        .iter()
        .filter(|project| match &project_id {
            Some(id) => &project.id == id,
            None => !project.is_archived(),
        })
        .map(|project| {
            let issues: Vec<&Issue> = snapshot.issues_in_project(&project.id).collect();
            let counts = compute_issue_counts(issues.iter().copied());
            ProjectStats {
                display_number: display_number(NodeKind::Project, project.number),
                name: project.name.clone(),
                created: format_date(project.created_at),
                counts,
                progress: compute_progress(&counts),
                metrics: compute_project_metrics(issues.iter().copied()),
            }
        })
        .collect();

    output::print_stats(&stats, output_mode, &output_config(app))?;
    Ok(())
}

/// Execute the order command
///
/// Fails when the dependency relation contains a cycle, naming the issues
/// on it.
pub fn execute_order(app: &App, args: &OrderArgs, output_mode: OutputMode) -> Result<()> {
    let project = project_filter(app, args.project.as_deref())?;
    let snapshot = app.snapshot();

    let issues: Vec<Issue> = active_issues(app, project.as_ref())
        .into_iter()
        .cloned()
        .collect();

    let Some(order) = topological_sort(&issues, &snapshot.edges) else {
        let cycles = DependencyGraph::from_edges(&snapshot.edges).find_cycles();
        let members: Vec<String> = cycles
            .iter()
            .map(|cycle| {
                cycle
                    .iter()
                    .map(IssueId::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .collect();
        return Err(Error::DependencyCycle(members.join("; ")).into());
    };

    output::print_order(&order, output_mode, &output_config(app))?;
    Ok(())
}

/// Execute the deps command
pub fn execute_deps(app: &App, args: &DepsArgs, output_mode: OutputMode) -> Result<()> {
    let snapshot = app.snapshot();
    let issue = snapshot.find_issue(&args.issue)?;
    let graph = DependencyGraph::from_edges(&snapshot.edges);

    let targets = |ids: &[IssueId]| -> Vec<DependencyTarget> {
        ids.iter()
            .filter_map(|id| snapshot.issue(id))
            .map(DependencyTarget::from)
            .collect()
    };

    let mut transitive: Vec<IssueId> = transitive_dependencies(&issue.id, &snapshot.edges)
        .into_iter()
        .collect();
    transitive.sort();
    let mut transitive = targets(transitive.as_slice());
    transitive.sort_by_key(|target| target.number);

    let report = DepsReport {
        issue: DependencyTarget::from(issue),
        depends_on: targets(graph.dependencies(&issue.id).as_slice()),
        blocks: targets(blocked_issues(&issue.id, &snapshot.edges).as_slice()),
        transitive,
    };
    tracing::debug!(
        issue = %issue.id,
        dependents = graph.dependents(&issue.id).len(),
        "Computed dependency report"
    );

    output::print_deps(&report, output_mode, &output_config(app))?;
    Ok(())
}

/// Execute the move command
pub async fn execute_move(app: &mut App, args: &MoveArgs, output_mode: OutputMode) -> Result<()> {
    let config = output_config(app);
    let nodes = app.tree();
    let index = ChildIndex::new(&nodes);

    let lookup = |reference: &str| -> Result<_> {
        let id = app.snapshot().find_node_id(reference)?;
        Ok(index
            .node(&id)
            .ok_or_else(|| SnapshotError::NotFound(reference.to_string()))?)
    };
    let source = lookup(&args.source)?;
    let target = lookup(&args.target)?;

    if !can_reparent(source, target, &nodes) {
        if source.parent_id.is_some() && source.parent_id == target.parent_id {
            anyhow::bail!(
                "{} and {} are siblings; use 'trellis reorder' to change their order",
                args.source,
                args.target
            );
        }
        return Err(Error::InvalidMove {
            node: args.source.clone(),
            target: args.target.clone(),
        }
        .into());
    }

    let update = reparent_updates(source, target, &nodes);
    tracing::debug!(?update, "Applying reparent");
    app.snapshot_mut().apply_reparent(&update)?;
    app.save().await?;

    match output_mode {
        OutputMode::Json => output::print_json(&update)?,
        OutputMode::Text => output::print_message(&output::success(
            &format!("Moved {} under {}", args.source, args.target),
            &config,
        ))?,
    }
    Ok(())
}

/// Execute the reorder command
///
/// Sibling positions are renumbered `0..n` before swapping so that missing
/// or duplicate sort orders cannot make the swap a no-op.
pub async fn execute_reorder(
    app: &mut App,
    args: &ReorderArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let config = output_config(app);
    let issue = app.snapshot().find_issue(&args.issue)?.clone();

    let mut siblings = app.snapshot().siblings(&issue);
    let Some(position) = siblings.iter().position(|sibling| sibling.id == issue.id) else {
        return Err(SnapshotError::NotFound(args.issue.clone()).into());
    };

    let renumbered = new_sort_orders(&siblings);
    for (sibling, update) in siblings.iter_mut().zip(&renumbered) {
        sibling.sort_order = Some(update.sort_order);
    }

    let swap = match args.direction {
        MoveDirection::Up => move_up(&siblings, position),
        MoveDirection::Down => move_down(&siblings, position),
    };

    if swap.is_empty() {
        let edge = match args.direction {
            MoveDirection::Up => "first",
            MoveDirection::Down => "last",
        };
        match output_mode {
            OutputMode::Json => output::print_json(&swap)?,
            OutputMode::Text => {
                output::print_message(&format!("{} is already {edge} among its siblings", args.issue))?;
            }
        }
        return Ok(());
    }

    let snapshot = app.snapshot_mut();
    snapshot.apply_sort_updates(&renumbered);
    snapshot.apply_sort_updates(&swap);
    app.save().await?;

    match output_mode {
        OutputMode::Json => output::print_json(&swap)?,
        OutputMode::Text => output::print_message(&output::success(
            &format!("Moved {} {}", args.issue, args.direction),
            &config,
        ))?,
    }
    Ok(())
}

/// Execute the transitions command
pub fn execute_transitions(
    args: &TransitionsArgs,
    output_mode: OutputMode,
    config: &OutputConfig,
) -> Result<()> {
    let from: IssueStatus = args.status.parse()?;
    let allowed = allowed_transitions_str(&args.status);

    output::print_transitions(from, allowed, output_mode, config)?;
    Ok(())
}

/// Execute the check command
pub async fn execute_check(app: &App, args: &CheckArgs, output_mode: OutputMode) -> Result<()> {
    let snapshot = app.snapshot();

    let size = tokio::fs::metadata(app.snapshot_path())
        .await
        .map_or(0, |metadata| metadata.len());

    let problems = snapshot
        .issues
        .iter()
        .flat_map(|issue| {
            check_issue(issue).into_iter().map(|error| IssueProblem {
                issue: issue.id.to_string(),
                error: error.to_string(),
            })
        })
        .collect();

    let cycles = DependencyGraph::from_edges(&snapshot.edges)
        .find_cycles()
        .into_iter()
        .map(|cycle| cycle.iter().map(IssueId::to_string).collect())
        .collect();

    let report = CheckReport {
        snapshot_path: app.snapshot_path().display().to_string(),
        snapshot_size: format_file_size(size),
        warnings: app.warnings().iter().map(ToString::to_string).collect(),
        problems,
        cycles,
    };

    output::print_check(&report, output_mode, &output_config(app))?;

    if args.strict && !report.is_clean() {
        anyhow::bail!("Snapshot check found problems");
    }
    Ok(())
}
