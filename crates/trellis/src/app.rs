//! Application context for CLI command execution.
//!
//! This module provides the `App` struct that loads a snapshot from the
//! repository and provides a context for executing CLI commands.
//!
//! # Example
//!
//! ```no_run
//! use trellis::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new(".")).await?;
//!     let nodes = app.tree();
//!     println!("{} nodes", nodes.len());
//!     Ok(())
//! }
//! ```

use crate::config::{find_trellis_root, TrellisConfig, CONFIG_FILE_NAME, TRELLIS_DIR_NAME};
use crate::error::{ConfigError, Result};
use crate::snapshot::{load_snapshot, save_snapshot, LoadWarning, Snapshot};
use std::path::{Path, PathBuf};
use trellis_core::hierarchy::{build_tree, TreeNode};

/// Application context for CLI operations.
///
/// Holds the loaded snapshot together with where it came from. Commands
/// read and edit the snapshot, then call [`App::save`].
#[derive(Debug)]
pub struct App {
    snapshot: Snapshot,
    warnings: Vec<LoadWarning>,
    config: TrellisConfig,
    trellis_dir: PathBuf,
    snapshot_path: PathBuf,
}

impl App {
    /// Create an App instance from the given working directory.
    ///
    /// Searches up the directory tree for `.trellis/`, loads the
    /// configuration and then the snapshot it names. Load warnings are
    /// logged and kept for the `check` command.
    ///
    /// # Errors
    ///
    /// Returns an error if no repository is found, or the configuration or
    /// snapshot cannot be read.
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_trellis_root(working_dir).ok_or(ConfigError::NotInitialized)?;

        let trellis_dir = root_dir.join(TRELLIS_DIR_NAME);
        let config = TrellisConfig::load(&trellis_dir.join(CONFIG_FILE_NAME)).await?;
        let snapshot_path = config.snapshot_path(&root_dir);

        let (snapshot, warnings) = load_snapshot(&snapshot_path).await?;
        for warning in &warnings {
            tracing::warn!(%warning, "Snapshot load warning");
        }

        Ok(Self {
            snapshot,
            warnings,
            config,
            trellis_dir,
            snapshot_path,
        })
    }

    /// The loaded snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// The loaded snapshot, for edits.
    pub fn snapshot_mut(&mut self) -> &mut Snapshot {
        &mut self.snapshot
    }

    /// Problems found while loading.
    #[must_use]
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Repository configuration.
    #[must_use]
    pub fn config(&self) -> &TrellisConfig {
        &self.config
    }

    /// Path to the `.trellis` directory.
    #[must_use]
    pub fn trellis_dir(&self) -> &Path {
        &self.trellis_dir
    }

    /// Path to the snapshot file.
    #[must_use]
    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// The flattened hierarchy with rollups, recomputed from the snapshot.
    #[must_use]
    pub fn tree(&self) -> Vec<TreeNode> {
        let (trees, _) = self.snapshot.project_trees();
        build_tree(&trees)
    }

    /// Write the snapshot back to disk.
    ///
    /// Dependencies are re-resolved first so the in-memory view stays
    /// consistent after edits.
    ///
    /// # Errors
    ///
    /// Fails when the snapshot cannot be written.
    pub async fn save(&mut self) -> Result<()> {
        self.snapshot.resolve_dependencies();
        save_snapshot(&self.snapshot, &self.snapshot_path).await
    }
}
