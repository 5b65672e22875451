//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for trellis using clap's derive API.
//! Each command has its own argument struct with validation and helpful error messages.
//!
//! # Commands
//!
//! - `init`: Initialize a new trellis repository
//! - `tree`: Show the project hierarchy
//! - `ready`: Show issues ready to work on
//! - `blocked`: Show blocked issues and their blockers
//! - `stats`: Show per-project counts, progress and story points
//! - `order`: List issues in dependency order
//! - `deps`: Show the dependencies of an issue
//! - `move`: Move a node under a new parent
//! - `reorder`: Move an issue up or down among its siblings
//! - `transitions`: Show the statuses reachable from a status
//! - `check`: Validate the snapshot
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! trellis tree --expand P-1
//! trellis ready P-1 --limit 5
//! trellis move I-4 E-2
//! trellis reorder I-4 up
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

// Re-export argument structs
pub use args::{
    BlockedArgs, CheckArgs, DepsArgs, InitArgs, MoveArgs, OrderArgs, ReadyArgs, ReorderArgs,
    StatsArgs, TransitionsArgs, TreeArgs,
};

// Re-export types
pub use types::MoveDirection;

// Re-export validators for external use
pub use validators::{validate_reference, validate_status};

/// Trellis - project, epic and issue tracking
///
/// Inspect and reshape a project hierarchy kept in a JSONL snapshot.
/// The snapshot lives in `.trellis/snapshot.jsonl` for easy version control integration.
#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new trellis repository
    ///
    /// Creates the `.trellis/` directory with configuration and an empty snapshot.
    Init(InitArgs),

    /// Show the project hierarchy
    ///
    /// Projects are always shown. Children of a node appear only when the
    /// node is expanded with `--expand`, or with `--all`.
    Tree(TreeArgs),

    /// Show issues ready to work on
    ///
    /// Lists `todo` issues with no open dependencies, highest priority first.
    Ready(ReadyArgs),

    /// Show blocked issues
    ///
    /// Lists issues with open dependencies, along with their blockers.
    Blocked(BlockedArgs),

    /// Show project statistics
    ///
    /// Displays issue counts by state, completion progress and story points.
    Stats(StatsArgs),

    /// List issues in dependency order
    ///
    /// Every issue appears after the issues it depends on. Fails if the
    /// dependencies contain a cycle.
    Order(OrderArgs),

    /// Show the dependencies of an issue
    ///
    /// Lists direct dependencies, direct dependents and every transitive
    /// dependency.
    Deps(DepsArgs),

    /// Move a node under a new parent
    ///
    /// Epics move between projects, issues between epics, and sub-issues
    /// between issues. The moved node is placed after its new siblings.
    Move(MoveArgs),

    /// Move an issue up or down among its siblings
    Reorder(ReorderArgs),

    /// Show the statuses reachable from a status
    Transitions(TransitionsArgs),

    /// Validate the snapshot
    ///
    /// Reports load warnings, invalid issues and dependency cycles.
    Check(CheckArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    #[must_use]
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns clap's error for invalid arguments.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    ///
    /// # Errors
    ///
    /// Returns the command's failure, including a missing repository.
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::{OutputConfig, OutputMode};

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Init(args)) => execute::execute_init(args).await,
            Some(Commands::Tree(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_tree(&app, args, output_mode)
            }
            Some(Commands::Ready(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_ready(&app, args, output_mode)
            }
            Some(Commands::Blocked(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_blocked(&app, args, output_mode)
            }
            Some(Commands::Stats(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_stats(&app, args, output_mode)
            }
            Some(Commands::Order(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_order(&app, args, output_mode)
            }
            Some(Commands::Deps(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_deps(&app, args, output_mode)
            }
            Some(Commands::Move(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_move(&mut app, args, output_mode).await
            }
            Some(Commands::Reorder(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_reorder(&mut app, args, output_mode).await
            }
            // Needs no repository.
            Some(Commands::Transitions(args)) => {
                execute::execute_transitions(args, output_mode, &OutputConfig::default())
            }
            Some(Commands::Check(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_check(&app, args, output_mode).await
            }
            None => {
                println!("Trellis project tracker");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== CLI Parsing Tests ==========

    #[test]
    fn test_parse_no_command() {
        let cli = Cli::try_parse_from(["trellis"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_parse_global_json_flag() {
        let cli = Cli::try_parse_from(["trellis", "--json", "ready"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Some(Commands::Ready(_))));
    }

    #[test]
    fn test_parse_json_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["trellis", "stats", "--json"]).unwrap();
        assert!(cli.json);
    }

    #[test]
    fn test_parse_init_quiet() {
        let cli = Cli::try_parse_from(["trellis", "init", "-q"]).unwrap();
        match cli.command {
            Some(Commands::Init(args)) => assert!(args.quiet),
            _ => panic!("Expected Init command"),
        }
    }

    #[test]
    fn test_parse_tree_expand_repeated() {
        let cli = Cli::try_parse_from(["trellis", "tree", "-e", "P-1", "--expand", "E-2"]).unwrap();
        match cli.command {
            Some(Commands::Tree(args)) => {
                assert_eq!(args.expand, vec!["P-1", "E-2"]);
                assert!(!args.all);
            }
            _ => panic!("Expected Tree command"),
        }
    }

    #[test]
    fn test_parse_tree_all_conflicts_with_expand() {
        let result = Cli::try_parse_from(["trellis", "tree", "--all", "--expand", "P-1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_ready_with_project_and_limit() {
        let cli = Cli::try_parse_from(["trellis", "ready", "P-2", "--limit", "3"]).unwrap();
        match cli.command {
            Some(Commands::Ready(args)) => {
                assert_eq!(args.project.as_deref(), Some("P-2"));
                assert_eq!(args.limit, Some(3));
            }
            _ => panic!("Expected Ready command"),
        }
    }

    #[test]
    fn test_parse_move() {
        let cli = Cli::try_parse_from(["trellis", "move", "I-4", "E-2"]).unwrap();
        match cli.command {
            Some(Commands::Move(args)) => {
                assert_eq!(args.source, "I-4");
                assert_eq!(args.target, "E-2");
            }
            _ => panic!("Expected Move command"),
        }
    }

    #[test]
    fn test_parse_move_requires_target() {
        assert!(Cli::try_parse_from(["trellis", "move", "I-4"]).is_err());
    }

    #[test]
    fn test_parse_reorder_direction() {
        let cli = Cli::try_parse_from(["trellis", "reorder", "I-1", "down"]).unwrap();
        match cli.command {
            Some(Commands::Reorder(args)) => {
                assert_eq!(args.issue, "I-1");
                assert_eq!(args.direction, MoveDirection::Down);
            }
            _ => panic!("Expected Reorder command"),
        }
    }

    #[test]
    fn test_parse_reorder_invalid_direction() {
        assert!(Cli::try_parse_from(["trellis", "reorder", "I-1", "sideways"]).is_err());
    }

    #[test]
    fn test_parse_transitions_validates_status() {
        assert!(Cli::try_parse_from(["trellis", "transitions", "in_review"]).is_ok());
        assert!(Cli::try_parse_from(["trellis", "transitions", "open"]).is_err());
    }

    #[test]
    fn test_parse_check_strict() {
        let cli = Cli::try_parse_from(["trellis", "check", "--strict"]).unwrap();
        match cli.command {
            Some(Commands::Check(args)) => assert!(args.strict),
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_parse_deps_rejects_empty_reference() {
        assert!(Cli::try_parse_from(["trellis", "deps", ""]).is_err());
    }
}
