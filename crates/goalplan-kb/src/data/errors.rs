//! Error types for the goal planner

use std::path::{Path, PathBuf};
use thiserror::Error;

use goalplan_interfaces::ProviderError;

/// Base Error type for core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to persist goal graph to {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: PersistenceError,
    },

    #[error("Goal graph has cycles, cannot determine topological order (goals on or behind a cycle: {remaining:?})")]
    CycleDetected { remaining: Vec<String> },

    #[error("Text completion provider unavailable: {0}")]
    ProviderUnavailable(#[from] ProviderError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal system error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Helper to create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        CoreError::InvalidArgument(message.into())
    }

    /// Helper to create a persistence error for the given file
    pub fn persistence(path: impl AsRef<Path>, source: impl Into<PersistenceError>) -> Self {
        CoreError::Persistence {
            path: path.as_ref().to_path_buf(),
            source: source.into(),
        }
    }

    /// Helper to report a closed service channel
    pub fn channel_closed(channel: &str) -> Self {
        CoreError::Internal(format!("{channel} channel closed"))
    }
}

/// Failure while reading or writing the persisted graph file.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<tempfile::PersistError> for PersistenceError {
    fn from(error: tempfile::PersistError) -> Self {
        PersistenceError::Io(error.error)
    }
}
