//! Repository configuration and the `init` command.
//!
//! A trellis repository is a directory containing `.trellis/` with a
//! `config.yaml` and the JSONL snapshot it points to.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the trellis directory
pub const TRELLIS_DIR_NAME: &str = ".trellis";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the snapshot data file
pub const SNAPSHOT_FILE_NAME: &str = "snapshot.jsonl";

/// Name of the gitignore file within .trellis
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Maximum directory depth to traverse when searching for the trellis root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Configuration file structure for trellis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrellisConfig {
    /// Snapshot path, relative to the repository root
    pub snapshot_file: String,

    /// Output preferences
    #[serde(default)]
    pub output: OutputSettings,
}

/// Output section of the configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputSettings {
    /// Use ASCII connectors and icons instead of Unicode
    #[serde(default)]
    pub ascii: bool,

    /// Force colors on or off; unset follows the environment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<bool>,
}

impl TrellisConfig {
    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or is not valid YAML.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        Ok(serde_yaml::from_str(&content).map_err(ConfigError::from)?)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be written.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).map_err(ConfigError::from)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Absolute snapshot path for a repository rooted at `root`.
    #[must_use]
    pub fn snapshot_path(&self, root: &Path) -> PathBuf {
        root.join(&self.snapshot_file)
    }
}

impl Default for TrellisConfig {
    fn default() -> Self {
        Self {
            snapshot_file: format!("{TRELLIS_DIR_NAME}/{SNAPSHOT_FILE_NAME}"),
            output: OutputSettings::default(),
        }
    }
}

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created trellis directory
    pub trellis_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created snapshot file
    pub snapshot_file: PathBuf,
    /// Path to the created gitignore file
    pub gitignore_file: PathBuf,
}

/// Initialize a new trellis repository in `base_dir`.
///
/// # Errors
///
/// Returns an error if `.trellis/` already exists or a file cannot be
/// written.
pub async fn init(base_dir: &Path) -> Result<InitResult> {
    let trellis_dir = base_dir.join(TRELLIS_DIR_NAME);

    if is_initialized(base_dir) {
        return Err(ConfigError::AlreadyInitialized(trellis_dir).into());
    }

    fs::create_dir_all(&trellis_dir).await?;

    let config_file = trellis_dir.join(CONFIG_FILE_NAME);
    let config = TrellisConfig::default();
    config.save(&config_file).await?;

    let snapshot_file = config.snapshot_path(base_dir);
    fs::write(&snapshot_file, "").await?;

    let gitignore_file = trellis_dir.join(GITIGNORE_FILE_NAME);
    fs::write(&gitignore_file, "# Temporary files from atomic snapshot writes\n*.tmp\n").await?;

    tracing::debug!(dir = %trellis_dir.display(), "Initialized trellis repository");

    Ok(InitResult {
        trellis_dir,
        config_file,
        snapshot_file,
        gitignore_file,
    })
}

/// Check if a directory has been initialized with trellis.
#[must_use]
pub fn is_initialized(base_dir: &Path) -> bool {
    base_dir.join(TRELLIS_DIR_NAME).exists()
}

/// Find the repository root by searching up from `start_dir`.
///
/// Returns the directory containing `.trellis/`, or `None` when the
/// filesystem root or [`MAX_TRAVERSAL_DEPTH`] is reached first.
#[must_use]
pub fn find_trellis_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(TRELLIS_DIR_NAME).exists() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}
