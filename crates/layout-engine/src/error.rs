//! Error type for the layout engine.

use std::{path::PathBuf, result::Result as StdResult};

use thiserror::Error;

/// Convenient result type for the engine crate.
pub type Result<T> = StdResult<T, Error>;

/// Unified error type for the layout engine.
///
/// Reconciliation failures are not errors; they are reported as data in
/// [`crate::ReconcileReport`].
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or parsing the engine configuration failed.
    #[error("config error{}: {message}", path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    Config {
        /// Config file, when loaded from disk.
        path: Option<PathBuf>,
        /// Human-readable message.
        message: String,
    },

    /// A configured selector did not parse.
    #[error("selector error: {0}")]
    Selector(#[from] layout_host::SelectorError),

    /// Persisting preferences failed.
    #[error("preference store error: {0}")]
    Prefs(#[from] layout_prefs::PrefsError),

    /// A host write failed.
    #[error("host error: {0}")]
    Host(#[from] layout_host::HostError),

    /// Scheduling passes needs a Tokio runtime and none is running.
    #[error("no Tokio runtime to schedule reconciliation passes on")]
    NoRuntime,
}
