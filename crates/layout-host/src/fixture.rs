//! RON fixtures describing a host tree for [`MemoryHost`].
//!
//! ```ron
//! (tag: "div", class: ["job-details-accordion-list"], children: [
//!     (tag: "div", class: ["st-accordion", "accordion"], children: [
//!         (tag: "button", attrs: [("aria-expanded", "false")],
//!          toggles: (target: "notes-body"), children: [
//!             (tag: "div", class: ["custom-accordion-header"], children: [
//!                 (tag: "p", text: "Notes"),
//!             ]),
//!         ]),
//!         (tag: "div", id: "notes-body", attrs: [("data-testid", "accordion-collapse")]),
//!     ]),
//! ])
//! ```

use ron::{Options, error::SpannedError, extensions::Extensions};
use serde::Deserialize;

use crate::{FixtureError, HostError, HostTree, MemoryHost, NodeId, ToggleMode};

/// Host toggle binding declared in a fixture.
#[derive(Clone, Debug, Deserialize)]
pub struct ToggleSpec {
    /// `id` of the body this toggle flips.
    pub target: String,
    /// Reaction policy.
    #[serde(default)]
    pub mode: ToggleMode,
}

/// One element in a fixture tree.
#[derive(Clone, Debug, Deserialize)]
pub struct ElementSpec {
    /// Tag name.
    pub tag: String,
    /// Optional `id` attribute.
    #[serde(default)]
    pub id: Option<String>,
    /// Class list.
    #[serde(default)]
    pub class: Vec<String>,
    /// Additional attributes.
    #[serde(default)]
    pub attrs: Vec<(String, String)>,
    /// Own text.
    #[serde(default)]
    pub text: String,
    /// Host toggle behaviour bound to this element.
    #[serde(default)]
    pub toggles: Option<ToggleSpec>,
    /// Host reverts class writes on this element.
    #[serde(default)]
    pub pinned: bool,
    /// Child elements.
    #[serde(default)]
    pub children: Vec<ElementSpec>,
}

impl ElementSpec {
    /// Parse a fixture from RON text.
    pub fn from_ron(text: &str) -> Result<Self, SpannedError> {
        Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .from_str(text)
    }
}

/// Build a host whose document contains the single element `spec`.
///
/// Toggle targets are resolved by `id` after the whole tree exists, so a
/// toggle may point at a body declared later in the fixture.
pub fn build_host(spec: &ElementSpec) -> Result<MemoryHost, FixtureError> {
    let host = MemoryHost::new();
    let mut bindings = Vec::new();
    materialize(&host, host.document(), spec, &mut bindings)?;
    for (toggle, t) in bindings {
        let target = host
            .find_by_id(&t.target)
            .ok_or_else(|| FixtureError::UnknownTarget(t.target.clone()))?;
        host.bind_toggle(toggle, target, t.mode)?;
    }
    Ok(host)
}

/// Parse RON text and build a host from it.
pub fn host_from_ron(text: &str) -> Result<MemoryHost, FixtureError> {
    let spec = ElementSpec::from_ron(text)?;
    build_host(&spec)
}

/// Recursively materialize `spec` under `parent`.
fn materialize(
    host: &MemoryHost,
    parent: NodeId,
    spec: &ElementSpec,
    bindings: &mut Vec<(NodeId, ToggleSpec)>,
) -> Result<NodeId, HostError> {
    let node = host.create(parent, &spec.tag)?;
    if let Some(id) = &spec.id {
        host.set_attr(node, "id", id)?;
    }
    for c in &spec.class {
        host.add_class(node, c)?;
    }
    for (k, v) in &spec.attrs {
        host.set_attr(node, k, v)?;
    }
    if !spec.text.is_empty() {
        host.set_text(node, &spec.text)?;
    }
    if spec.pinned {
        host.pin_classes(node, true)?;
    }
    if let Some(t) = &spec.toggles {
        bindings.push((node, t.clone()));
    }
    for child in &spec.children {
        materialize(host, node, child, bindings)?;
    }
    Ok(node)
}
