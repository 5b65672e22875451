//! Output formatting for CLI commands.
//!
//! This module provides utilities for formatting command output in both
//! human-readable text format and JSON format for programmatic use.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers (semantic colors, icons)
//! - [`tree`]: Hierarchy rendering with ASCII/Unicode connectors

pub mod color;
pub mod tree;

use crate::config::OutputSettings;
use serde::Serialize;
use std::env;
use std::io::{self, Write};
use trellis_core::counts::{IssueCounts, Progress};
use trellis_core::domain::{DependencyTarget, Issue, IssueStatus};
use trellis_core::format::display_number;
use trellis_core::hierarchy::{NodeKind, TreeNode};
use trellis_core::metrics::ProjectMetrics;

pub use color::{error, info, success, warning};

use color::{bold, colored_status_icon, colorize_number, colorize_percentage, colorize_priority, colorize_status, dimmed};

// ============================================================================
// Output Configuration
// ============================================================================

/// Configuration for output formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use ASCII-only icons and connectors instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new `OutputConfig` with explicit values.
    #[must_use]
    pub fn new(use_ascii: bool, use_colors: bool) -> Self {
        Self {
            use_ascii,
            use_colors,
        }
    }

    /// Combine repository settings with the environment.
    ///
    /// Reads:
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `TRELLIS_ASCII`: Set to "1" or "true" for ASCII-only output
    #[must_use]
    pub fn from_settings(settings: &OutputSettings) -> Self {
        Self::resolve(
            settings,
            env::var_os("NO_COLOR").is_some(),
            env::var("TRELLIS_ASCII").ok().as_deref(),
        )
    }

    fn resolve(settings: &OutputSettings, no_color: bool, ascii_env: Option<&str>) -> Self {
        let env_ascii = match ascii_env {
            Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Some(v) if v.is_empty() || v == "0" || v.eq_ignore_ascii_case("false") => false,
            Some(v) => {
                tracing::warn!(
                    env_var = "TRELLIS_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            None => false,
        };

        // Respect NO_COLOR standard (https://no-color.org/)
        let use_colors = !no_color && settings.colors.unwrap_or(true);

        Self {
            use_ascii: settings.ascii || env_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_settings(&OutputSettings::default())
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

// ============================================================================
// Report Types
// ============================================================================

/// One issue in a list, with its display number resolved.
#[derive(Debug, Clone, Serialize)]
pub struct IssueRow<'a> {
    /// `I-<n>` or `S-<n>` style number
    pub display_number: String,
    /// The issue
    pub issue: &'a Issue,
    /// Whether an open dependency blocks it
    pub blocked: bool,
    /// Due label of the issue's milestone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
}

/// A blocked issue with the targets still holding it up.
#[derive(Debug, Clone, Serialize)]
pub struct BlockedRow<'a> {
    /// Display number of the blocked issue
    pub display_number: String,
    /// The blocked issue
    pub issue: &'a Issue,
    /// Open dependency targets, in dependency order
    pub blockers: Vec<&'a DependencyTarget>,
}

/// Summary numbers for one project.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectStats {
    /// `P-<n>`
    pub display_number: String,
    /// Project name
    pub name: String,
    /// Creation date, formatted for display
    pub created: String,
    /// Per-state issue counts
    pub counts: IssueCounts,
    /// Completed issues over all issues
    pub progress: Progress,
    /// Story point totals
    pub metrics: ProjectMetrics,
}

/// Direct and transitive dependencies of one issue.
#[derive(Debug, Clone, Serialize)]
pub struct DepsReport {
    /// The issue asked about
    pub issue: DependencyTarget,
    /// Issues it directly depends on
    pub depends_on: Vec<DependencyTarget>,
    /// Issues that directly depend on it
    pub blocks: Vec<DependencyTarget>,
    /// Everything reachable through dependency edges
    pub transitive: Vec<DependencyTarget>,
}

/// One invalid issue found by `check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueProblem {
    /// Issue id
    pub issue: String,
    /// What is wrong with it
    pub error: String,
}

/// Result of `check`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    /// Snapshot file that was checked
    pub snapshot_path: String,
    /// Its size on disk, formatted
    pub snapshot_size: String,
    /// Problems found while loading
    pub warnings: Vec<String>,
    /// Field validation failures of loaded issues
    pub problems: Vec<IssueProblem>,
    /// Dependency cycles, as issue ids
    pub cycles: Vec<Vec<String>>,
}

impl CheckReport {
    /// Whether nothing was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.problems.is_empty() && self.cycles.is_empty()
    }
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print a plain message
pub fn print_message(msg: &str) -> io::Result<()> {
    let mut handle = io::stdout().lock();
    writeln!(handle, "{msg}")
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let mut handle = io::stdout().lock();
    serde_json::to_writer_pretty(&mut handle, value).map_err(io::Error::other)?;
    writeln!(handle)
}

/// Print visible hierarchy nodes
pub fn print_tree(nodes: &[&TreeNode], mode: OutputMode, config: &OutputConfig) -> io::Result<()> {
    match mode {
        OutputMode::Text => tree::print_tree_text(&mut io::stdout().lock(), nodes, config),
        OutputMode::Json => print_json(&nodes),
    }
}

/// Print a list of issues under a title
pub fn print_issues(
    title: &str,
    rows: &[IssueRow<'_>],
    mode: OutputMode,
    config: &OutputConfig,
) -> io::Result<()> {
    match mode {
        OutputMode::Text => print_issues_text(&mut io::stdout().lock(), title, rows, config),
        OutputMode::Json => print_json(&rows),
    }
}

/// Print blocked issues with their blockers
pub fn print_blocked(rows: &[BlockedRow<'_>], mode: OutputMode, config: &OutputConfig) -> io::Result<()> {
    match mode {
        OutputMode::Text => print_blocked_text(&mut io::stdout().lock(), rows, config),
        OutputMode::Json => print_json(&rows),
    }
}

/// Print per-project statistics
pub fn print_stats(stats: &[ProjectStats], mode: OutputMode, config: &OutputConfig) -> io::Result<()> {
    match mode {
        OutputMode::Text => print_stats_text(&mut io::stdout().lock(), stats, config),
        OutputMode::Json => print_json(&stats),
    }
}

/// Print issues in dependency order
pub fn print_order(order: &[&Issue], mode: OutputMode, config: &OutputConfig) -> io::Result<()> {
    match mode {
        OutputMode::Text => print_order_text(&mut io::stdout().lock(), order, config),
        OutputMode::Json => print_json(&order),
    }
}

/// Print the dependency report of one issue
pub fn print_deps(report: &DepsReport, mode: OutputMode, config: &OutputConfig) -> io::Result<()> {
    match mode {
        OutputMode::Text => print_deps_text(&mut io::stdout().lock(), report, config),
        OutputMode::Json => print_json(report),
    }
}

/// Print the statuses reachable from `from`
pub fn print_transitions(
    from: IssueStatus,
    allowed: &[IssueStatus],
    mode: OutputMode,
    config: &OutputConfig,
) -> io::Result<()> {
    match mode {
        OutputMode::Text => print_transitions_text(&mut io::stdout().lock(), from, allowed, config),
        OutputMode::Json => print_json(&serde_json::json!({
            "from": from,
            "allowed": allowed,
        })),
    }
}

/// Print the result of `check`
pub fn print_check(report: &CheckReport, mode: OutputMode, config: &OutputConfig) -> io::Result<()> {
    match mode {
        OutputMode::Text => print_check_text(&mut io::stdout().lock(), report, config),
        OutputMode::Json => print_json(report),
    }
}

// ============================================================================
// Text Formatting
// ============================================================================

/// Display number of an issue or sub-issue.
pub(crate) fn issue_number(issue: &Issue) -> String {
    let kind = if issue.is_sub_issue() {
        NodeKind::SubIssue
    } else {
        NodeKind::Issue
    };
    display_number(kind, issue.number)
}

fn print_issues_text<W: Write>(
    w: &mut W,
    title: &str,
    rows: &[IssueRow<'_>],
    config: &OutputConfig,
) -> io::Result<()> {
    if rows.is_empty() {
        return writeln!(w, "No {}.", title.to_lowercase());
    }

    writeln!(w, "{} ({}):", bold(title, config), rows.len())?;
    writeln!(w)?;
    for row in rows {
        write!(
            w,
            "  {} {} {} {}",
            colored_status_icon(row.issue.status, row.blocked, config),
            colorize_number(&row.display_number, config),
            colorize_priority(row.issue.priority, config),
            row.issue.title
        )?;
        if let Some(points) = row.issue.story_points {
            write!(w, " ({points} pts)")?;
        }
        if let Some(due) = &row.due {
            write!(w, "  {}", dimmed(&format!("due {due}"), config))?;
        }
        writeln!(w)?;
    }
    Ok(())
}

fn print_blocked_text<W: Write>(
    w: &mut W,
    rows: &[BlockedRow<'_>],
    config: &OutputConfig,
) -> io::Result<()> {
    if rows.is_empty() {
        return writeln!(w, "No blocked issues.");
    }

    writeln!(w, "{} ({}):", bold("Blocked issues", config), rows.len())?;
    writeln!(w)?;
    for row in rows {
        writeln!(
            w,
            "  {} {} {}",
            colored_status_icon(row.issue.status, true, config),
            colorize_number(&row.display_number, config),
            row.issue.title
        )?;
        for blocker in &row.blockers {
            writeln!(
                w,
                "      {} {} {} ({})",
                dimmed("waiting on", config),
                colorize_number(&display_number(NodeKind::Issue, blocker.number), config),
                blocker.title,
                colorize_status(blocker.status, false, config)
            )?;
        }
    }
    Ok(())
}

fn print_stats_text<W: Write>(
    w: &mut W,
    stats: &[ProjectStats],
    config: &OutputConfig,
) -> io::Result<()> {
    if stats.is_empty() {
        return writeln!(w, "No projects.");
    }

    for (i, project) in stats.iter().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        writeln!(
            w,
            "{} {}  {}",
            colorize_number(&project.display_number, config),
            bold(&project.name, config),
            dimmed(&format!("created {}", project.created), config)
        )?;
        let counts = &project.counts;
        writeln!(
            w,
            "  Issues:   {} total ({} ready, {} blocked, {} doing, {} in review, {} done, {} canceled)",
            counts.total(),
            counts.ready,
            counts.blocked,
            counts.doing,
            counts.in_review,
            counts.done,
            counts.canceled
        )?;
        writeln!(
            w,
            "  Progress: {}/{} ({})",
            project.progress.completed,
            project.progress.total,
            colorize_percentage(project.progress.percentage, config)
        )?;
        writeln!(
            w,
            "  Points:   {} active / {} total",
            project.metrics.active_story_points, project.metrics.total_story_points
        )?;
    }
    Ok(())
}

fn print_order_text<W: Write>(w: &mut W, order: &[&Issue], config: &OutputConfig) -> io::Result<()> {
    if order.is_empty() {
        return writeln!(w, "No issues.");
    }

    let width = order.len().to_string().len();
    for (i, issue) in order.iter().enumerate() {
        writeln!(
            w,
            "{:>width$}. {} {} {}",
            i + 1,
            colored_status_icon(issue.status, false, config),
            colorize_number(&issue_number(issue), config),
            issue.title
        )?;
    }
    Ok(())
}

fn print_target_list<W: Write>(
    w: &mut W,
    heading: &str,
    targets: &[DependencyTarget],
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(w, "{}:", bold(heading, config))?;
    if targets.is_empty() {
        return writeln!(w, "  {}", dimmed("(none)", config));
    }
    for target in targets {
        writeln!(
            w,
            "  {} {} {}",
            colored_status_icon(target.status, false, config),
            colorize_number(&display_number(NodeKind::Issue, target.number), config),
            target.title
        )?;
    }
    Ok(())
}

fn print_deps_text<W: Write>(w: &mut W, report: &DepsReport, config: &OutputConfig) -> io::Result<()> {
    writeln!(
        w,
        "{} {}",
        colorize_number(&display_number(NodeKind::Issue, report.issue.number), config),
        bold(&report.issue.title, config)
    )?;
    writeln!(w)?;
    print_target_list(w, "Depends on", &report.depends_on, config)?;
    print_target_list(w, "Blocks", &report.blocks, config)?;
    print_target_list(w, "All dependencies", &report.transitive, config)
}

fn print_transitions_text<W: Write>(
    w: &mut W,
    from: IssueStatus,
    allowed: &[IssueStatus],
    config: &OutputConfig,
) -> io::Result<()> {
    if allowed.is_empty() {
        return writeln!(
            w,
            "{} is final; no transitions allowed.",
            colorize_status(from, false, config)
        );
    }
    let targets: Vec<String> = allowed
        .iter()
        .map(|status| colorize_status(*status, false, config))
        .collect();
    writeln!(w, "{} -> {}", colorize_status(from, false, config), targets.join(", "))
}

fn print_check_text<W: Write>(w: &mut W, report: &CheckReport, config: &OutputConfig) -> io::Result<()> {
    writeln!(
        w,
        "Checked {} ({})",
        report.snapshot_path,
        dimmed(&report.snapshot_size, config)
    )?;

    if report.is_clean() {
        return writeln!(w, "{}", success("No problems found.", config));
    }

    for message in &report.warnings {
        writeln!(w, "  {} {message}", warning("warning:", config))?;
    }
    for problem in &report.problems {
        writeln!(w, "  {} {}: {}", error("invalid:", config), problem.issue, problem.error)?;
    }
    for cycle in &report.cycles {
        writeln!(w, "  {} {}", error("cycle:", config), cycle.join(" -> "))?;
    }
    Ok(())
}
