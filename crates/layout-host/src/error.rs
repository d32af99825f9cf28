use std::result;

use ron::error::SpannedError;
use thiserror::Error;

use crate::NodeId;

/// Errors surfaced by host tree writes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The node was removed or replaced by a host re-render.
    #[error("node {0:?} is no longer attached")]
    Detached(NodeId),

    /// The host refused the operation for this node.
    #[error("operation {op} unsupported on node {node:?}")]
    Unsupported {
        /// Operation name (e.g., "dispatch_click").
        op: &'static str,
        /// Target node.
        node: NodeId,
    },

    /// Moving a node would make it its own ancestor.
    #[error("cannot move {child:?} under its descendant {parent:?}")]
    Cycle {
        /// Node being moved.
        child: NodeId,
        /// Requested new parent.
        parent: NodeId,
    },
}

/// A selector string could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid selector {source_text:?}: {message}")]
pub struct SelectorError {
    /// The selector text as supplied.
    pub source_text: String,
    /// What went wrong.
    pub message: String,
}

impl SelectorError {
    /// Build an error for `source_text`.
    pub fn new(source_text: &str, message: impl Into<String>) -> Self {
        Self {
            source_text: source_text.to_string(),
            message: message.into(),
        }
    }
}

/// A RON fixture could not be turned into a host.
#[derive(Error, Debug)]
pub enum FixtureError {
    /// The RON text did not parse.
    #[error("fixture parse error: {0}")]
    Parse(#[from] SpannedError),

    /// A toggle names a body id that does not exist.
    #[error("toggle target {0:?} not found in fixture")]
    UnknownTarget(String),

    /// Building the tree failed.
    #[error("fixture build error: {0}")]
    Host(#[from] HostError),
}

/// Result alias for host operations.
pub type Result<T> = result::Result<T, HostError>;
