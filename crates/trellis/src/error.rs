//! Error types for trellis operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use trellis_core::ValidationError;

/// The error type for trellis operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Snapshot error.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// A field or relation failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The requested move is not a permitted reparent.
    #[error("Cannot move {node} under {target}")]
    InvalidMove {
        /// Node being moved
        node: String,
        /// Requested new parent
        target: String,
    },

    /// The dependency relation contains a cycle.
    #[error("Dependency cycle detected among: {0}")]
    DependencyCycle(String),
}

/// Errors locating, reading or writing the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No `.trellis/` directory in the working directory or any parent.
    #[error("Not a trellis repository (or any parent directory). Run 'trellis init' first.")]
    NotInitialized,

    /// `init` was run where a `.trellis/` directory already exists.
    #[error("Trellis is already initialized in this directory. Found existing '{0}'")]
    AlreadyInitialized(PathBuf),

    /// The configuration file could not be parsed or written.
    #[error("Invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors reading, writing or querying a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// A record could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A reference matched nothing in the snapshot.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A display number matched more than one entity.
    #[error("Ambiguous reference '{reference}': matches {count} entities, use the id instead")]
    Ambiguous {
        /// The reference as given
        reference: String,
        /// Number of matches
        count: usize,
    },
}

/// A specialized Result type for trellis operations.
pub type Result<T> = std::result::Result<T, Error>;
