use std::{io, path::PathBuf, result::Result as StdResult};

use thiserror::Error;

/// Convenient result type for the preference store.
pub type Result<T> = StdResult<T, PrefsError>;

/// Errors surfaced by preference writes.
#[derive(Debug, Error)]
pub enum PrefsError {
    /// Filesystem failure in a file-backed store.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },

    /// Serializing the record failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The namespace key cannot be used as a storage name.
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
}

impl PrefsError {
    /// Attach a path to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
