//! Error handling for the layout-tester crate.

use std::{io, path::PathBuf, result};

use thiserror::Error;

/// Convenient result type for layout-tester operations.
pub type Result<T> = result::Result<T, Error>;

/// Errors that can occur while running the tester.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading an input file failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// Building the Tokio runtime failed.
    #[error("runtime error: {0}")]
    Runtime(#[source] io::Error),
    /// The fixture tree did not parse or resolve.
    #[error("fixture error: {0}")]
    Fixture(#[from] layout_host::FixtureError),
    /// Engine setup failed.
    #[error("engine error: {0}")]
    Engine(#[from] layout_engine::Error),
    /// A preference store operation failed.
    #[error("store error: {0}")]
    Prefs(#[from] layout_prefs::PrefsError),
    /// The reordering surface could not open.
    #[error("{0}")]
    Surface(#[from] layout_engine::SurfaceError),
    /// A scripted edit named a row that does not exist.
    #[error("no row titled '{0}'")]
    UnknownRow(String),
}
