//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use clap::Parser;

use super::types::MoveDirection;
use super::validators::{validate_reference, validate_status};

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `tree` command
#[derive(Parser, Debug, Clone)]
pub struct TreeArgs {
    /// Expand a node so its children are shown (repeatable)
    ///
    /// Accepts display numbers like `P-1` or `E-2`, or raw ids.
    #[arg(short, long, value_parser = validate_reference)]
    pub expand: Vec<String>,

    /// Expand every node
    #[arg(short, long, conflicts_with = "expand")]
    pub all: bool,
}

/// Arguments for the `ready` command
#[derive(Parser, Debug, Clone)]
pub struct ReadyArgs {
    /// Only issues of this project
    #[arg(value_parser = validate_reference)]
    pub project: Option<String>,

    /// Maximum number of issues to show
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for the `blocked` command
#[derive(Parser, Debug, Clone)]
pub struct BlockedArgs {
    /// Only issues of this project
    #[arg(value_parser = validate_reference)]
    pub project: Option<String>,
}

/// Arguments for the `stats` command
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Only this project
    #[arg(value_parser = validate_reference)]
    pub project: Option<String>,
}

/// Arguments for the `order` command
#[derive(Parser, Debug, Clone)]
pub struct OrderArgs {
    /// Only issues of this project
    #[arg(value_parser = validate_reference)]
    pub project: Option<String>,
}

/// Arguments for the `deps` command
#[derive(Parser, Debug, Clone)]
pub struct DepsArgs {
    /// Issue to inspect
    #[arg(value_parser = validate_reference)]
    pub issue: String,
}

/// Arguments for the `move` command
#[derive(Parser, Debug, Clone)]
pub struct MoveArgs {
    /// Epic, issue or sub-issue to move
    #[arg(value_parser = validate_reference)]
    pub source: String,

    /// New parent: a project for epics, an epic for issues, an issue for
    /// sub-issues
    #[arg(value_parser = validate_reference)]
    pub target: String,
}

/// Arguments for the `reorder` command
#[derive(Parser, Debug, Clone)]
pub struct ReorderArgs {
    /// Issue or sub-issue to move
    #[arg(value_parser = validate_reference)]
    pub issue: String,

    /// Which way to move it among its siblings
    #[arg(value_enum)]
    pub direction: MoveDirection,
}

/// Arguments for the `transitions` command
#[derive(Parser, Debug, Clone)]
pub struct TransitionsArgs {
    /// Current status (todo, doing, in_review, done, canceled)
    #[arg(value_parser = validate_status)]
    pub status: String,
}

/// Arguments for the `check` command
#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    /// Exit with an error when problems are found
    #[arg(long)]
    pub strict: bool,
}
