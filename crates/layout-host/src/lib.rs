//! layout-host: the host tree contract consumed by the layout engine.
//!
//! The host is a third-party, asynchronously rendered element tree that we do
//! not own. This crate defines the narrow surface the engine is allowed to
//! touch ([`HostTree`]), a small selector language used to locate structural
//! cues inside that tree, query helpers built on top of the trait, and an
//! in-memory implementation ([`MemoryHost`]) used by tests and the tester
//! binary.
//!
//! Node handles are cheap and copyable but carry no lifetime guarantees: the
//! host may re-render at any time, so callers re-resolve before acting and
//! treat [`HostError::Detached`] as "try again later".

mod error;
mod fixture;
mod memory;
pub mod query;
mod selector;

pub use error::{FixtureError, HostError, Result, SelectorError};
pub use fixture::{ElementSpec, ToggleSpec, build_host, host_from_ron};
pub use memory::{EXPANDED_ATTR, MemoryHost, OPEN_CLASS, ToggleMode};
pub use selector::Selector;

/// Opaque handle to a node in the host tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Construct a handle from a raw host-assigned value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw host-assigned value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Rendered visibility of a node as controlled by its inline display style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Display {
    /// Host default (no inline override).
    #[default]
    Default,
    /// Inline `display: none`.
    Hidden,
}

/// Trait abstraction over the live host tree to improve testability.
///
/// Implementations use interior mutability; every call observes the tree as it
/// is right now. Reads on a node that no longer exists return empty values,
/// writes return [`HostError::Detached`].
pub trait HostTree: Send + Sync {
    /// Root of the whole document.
    fn document(&self) -> NodeId;
    /// Parent of `node`, if attached.
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    /// Element children of `node` in document order.
    fn children(&self, node: NodeId) -> Vec<NodeId>;
    /// Lower-case tag name, or `None` if the node is gone.
    fn tag(&self, node: NodeId) -> Option<String>;
    /// Attribute value.
    fn attr(&self, node: NodeId, name: &str) -> Option<String>;
    /// Class list in declaration order.
    fn classes(&self, node: NodeId) -> Vec<String>;
    /// Text content of the subtree rooted at `node`.
    fn text(&self, node: NodeId) -> String;
    /// Current inline display override.
    fn display(&self, node: NodeId) -> Display;
    /// Set the inline display override.
    fn set_display(&self, node: NodeId, display: Display) -> Result<()>;
    /// Add (`on = true`) or remove a class.
    fn set_class(&self, node: NodeId, class: &str, on: bool) -> Result<()>;
    /// Drop any inline height left behind by a host transition.
    fn clear_inline_height(&self, node: NodeId) -> Result<()>;
    /// Move an existing `child` to the end of `parent`'s children.
    fn append_child(&self, parent: NodeId, child: NodeId) -> Result<()>;
    /// Dispatch a synthetic, bubbling click on `node`.
    fn dispatch_click(&self, node: NodeId) -> Result<()>;
    /// Invoke the node's own click behaviour directly.
    fn click(&self, node: NodeId) -> Result<()>;

    /// True if `node` carries `class`.
    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.classes(node).iter().any(|c| c == class)
    }
}
