//! In-memory host tree used by tests and the tester binary.
//!
//! `MemoryHost` behaves like a minimal element tree with just enough host
//! behaviour to exercise reconciliation: bound toggles that flip a body's open
//! class (optionally lagging or ignoring clicks), nodes whose class writes the
//! host silently reverts, and counters for engine-initiated writes.

use parking_lot::Mutex;
use serde::Deserialize;

use crate::{Display, HostError, HostTree, NodeId, Result};

/// Class the simulated host puts on an expanded body.
pub const OPEN_CLASS: &str = "show";
/// Attribute the simulated host mirrors onto a toggle.
pub const EXPANDED_ATTR: &str = "aria-expanded";

/// How a bound toggle reacts to activation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleMode {
    /// Every activation flips the target.
    #[default]
    Immediate,
    /// Activations before the Nth are swallowed; from the Nth on, each flips.
    AfterClicks(u32),
    /// Activations never change anything.
    Never,
}

/// Host-side behaviour bound to a toggle node.
#[derive(Clone, Debug)]
struct Toggle {
    /// Body whose open class is flipped.
    target: usize,
    /// Reaction policy.
    mode: ToggleMode,
    /// Activations received so far.
    presses: u32,
}

/// A single element.
#[derive(Clone, Debug, Default)]
struct Node {
    /// Lower-case tag.
    tag: String,
    /// Attributes in insertion order.
    attrs: Vec<(String, String)>,
    /// Class list.
    classes: Vec<String>,
    /// Own text (children contribute theirs separately).
    text: String,
    /// Parent index.
    parent: Option<usize>,
    /// Child indices in order.
    children: Vec<usize>,
    /// Inline display override.
    display: Display,
    /// Leftover inline height from a transition.
    inline_height: bool,
    /// False once removed by a simulated re-render.
    attached: bool,
    /// Bound toggle behaviour.
    toggle: Option<Toggle>,
    /// Class writes are accepted but ignored.
    pinned: bool,
    /// Activations delivered to this node.
    clicks: u32,
}

/// Interior state guarded by the host mutex.
#[derive(Debug)]
struct Inner {
    /// Arena; index 0 is the document.
    nodes: Vec<Node>,
    /// Engine-initiated write calls.
    mutations: u64,
    /// When false, `dispatch_click` is refused.
    dispatch_available: bool,
}

impl Inner {
    /// Attached node index for `id`.
    fn live(&self, id: NodeId) -> Option<usize> {
        let idx = usize::try_from(id.raw()).ok()?;
        self.nodes.get(idx).filter(|n| n.attached).map(|_| idx)
    }

    /// Attached node index or a detached error.
    fn live_or_err(&self, id: NodeId) -> Result<usize> {
        self.live(id).ok_or(HostError::Detached(id))
    }

    /// True if `anc` is `idx` or one of its ancestors.
    fn is_inclusive_ancestor(&self, anc: usize, idx: usize) -> bool {
        let mut cur = Some(idx);
        while let Some(i) = cur {
            if i == anc {
                return true;
            }
            cur = self.nodes[i].parent;
        }
        false
    }

    /// Detach `idx` from its parent's child list.
    fn unlink(&mut self, idx: usize) {
        if let Some(p) = self.nodes[idx].parent.take() {
            self.nodes[p].children.retain(|&c| c != idx);
        }
    }

    /// Deliver an activation starting at `idx`, bubbling to the first bound toggle.
    fn activate(&mut self, idx: usize) {
        self.nodes[idx].clicks += 1;
        let mut cur = Some(idx);
        while let Some(i) = cur {
            if self.nodes[i].toggle.is_some() {
                self.fire_toggle(i);
                return;
            }
            cur = self.nodes[i].parent;
        }
    }

    /// Apply a toggle's host behaviour.
    fn fire_toggle(&mut self, idx: usize) {
        let Some(toggle) = self.nodes[idx].toggle.as_mut() else {
            return;
        };
        toggle.presses += 1;
        let flip = match toggle.mode {
            ToggleMode::Immediate => true,
            ToggleMode::AfterClicks(n) => toggle.presses >= n,
            ToggleMode::Never => false,
        };
        let target = toggle.target;
        if !flip || !self.nodes[target].attached {
            return;
        }
        let body = &mut self.nodes[target];
        let open = if body.classes.iter().any(|c| c == OPEN_CLASS) {
            body.classes.retain(|c| c != OPEN_CLASS);
            false
        } else {
            body.classes.push(OPEN_CLASS.to_string());
            true
        };
        let node = &mut self.nodes[idx];
        if let Some(slot) = node.attrs.iter_mut().find(|(k, _)| k == EXPANDED_ATTR) {
            slot.1 = open.to_string();
        }
    }

    /// Collect own text of the subtree rooted at `idx`.
    fn collect_text(&self, idx: usize, out: &mut String) {
        out.push_str(&self.nodes[idx].text);
        for &c in &self.nodes[idx].children {
            self.collect_text(c, out);
        }
    }
}

/// Simple in-memory implementation of [`HostTree`].
#[derive(Debug)]
pub struct MemoryHost {
    /// Arena and counters.
    inner: Mutex<Inner>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    /// Create a host containing only the document node.
    pub fn new() -> Self {
        let doc = Node {
            tag: "#document".to_string(),
            attached: true,
            ..Node::default()
        };
        Self {
            inner: Mutex::new(Inner {
                nodes: vec![doc],
                mutations: 0,
                dispatch_available: true,
            }),
        }
    }

    /// Append a new element with `tag` under `parent`.
    pub fn create(&self, parent: NodeId, tag: &str) -> Result<NodeId> {
        let mut g = self.inner.lock();
        let p = g.live_or_err(parent)?;
        let idx = g.nodes.len();
        g.nodes.push(Node {
            tag: tag.to_ascii_lowercase(),
            parent: Some(p),
            attached: true,
            ..Node::default()
        });
        g.nodes[p].children.push(idx);
        Ok(NodeId::new(idx as u64))
    }

    /// Set or replace an attribute.
    pub fn set_attr(&self, node: NodeId, name: &str, value: &str) -> Result<()> {
        let mut g = self.inner.lock();
        let i = g.live_or_err(node)?;
        let attrs = &mut g.nodes[i].attrs;
        match attrs.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => attrs.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    /// Add a class without counting it as an engine write.
    pub fn add_class(&self, node: NodeId, class: &str) -> Result<()> {
        let mut g = self.inner.lock();
        let i = g.live_or_err(node)?;
        if !g.nodes[i].classes.iter().any(|c| c == class) {
            g.nodes[i].classes.push(class.to_string());
        }
        Ok(())
    }

    /// Replace the node's own text.
    pub fn set_text(&self, node: NodeId, text: &str) -> Result<()> {
        let mut g = self.inner.lock();
        let i = g.live_or_err(node)?;
        g.nodes[i].text = text.to_string();
        Ok(())
    }

    /// Mark a leftover inline height, as a host transition would.
    pub fn set_inline_height(&self, node: NodeId) -> Result<()> {
        let mut g = self.inner.lock();
        let i = g.live_or_err(node)?;
        g.nodes[i].inline_height = true;
        Ok(())
    }

    /// True if an inline height is present.
    pub fn has_inline_height(&self, node: NodeId) -> bool {
        let g = self.inner.lock();
        g.live(node).is_some_and(|i| g.nodes[i].inline_height)
    }

    /// Bind host toggle behaviour: activating `toggle` flips `target`'s open class.
    pub fn bind_toggle(&self, toggle: NodeId, target: NodeId, mode: ToggleMode) -> Result<()> {
        let mut g = self.inner.lock();
        let t = g.live_or_err(toggle)?;
        let b = g.live_or_err(target)?;
        g.nodes[t].toggle = Some(Toggle {
            target: b,
            mode,
            presses: 0,
        });
        Ok(())
    }

    /// Change the reaction policy of an existing toggle.
    pub fn set_toggle_mode(&self, toggle: NodeId, mode: ToggleMode) -> Result<()> {
        let mut g = self.inner.lock();
        let t = g.live_or_err(toggle)?;
        match g.nodes[t].toggle.as_mut() {
            Some(tg) => {
                tg.mode = mode;
                tg.presses = 0;
                Ok(())
            }
            None => Err(HostError::Unsupported {
                op: "set_toggle_mode",
                node: toggle,
            }),
        }
    }

    /// When pinned, class writes on `node` are accepted but have no effect.
    pub fn pin_classes(&self, node: NodeId, pinned: bool) -> Result<()> {
        let mut g = self.inner.lock();
        let i = g.live_or_err(node)?;
        g.nodes[i].pinned = pinned;
        Ok(())
    }

    /// Make synthetic dispatch available or not.
    pub fn set_dispatch_available(&self, available: bool) {
        self.inner.lock().dispatch_available = available;
    }

    /// Remove `node` and its subtree, as a host re-render would.
    pub fn remove(&self, node: NodeId) -> Result<()> {
        let mut g = self.inner.lock();
        let i = g.live_or_err(node)?;
        g.unlink(i);
        let mut stack = vec![i];
        while let Some(n) = stack.pop() {
            g.nodes[n].attached = false;
            stack.extend(g.nodes[n].children.iter().copied());
        }
        Ok(())
    }

    /// Number of engine-initiated write calls so far.
    pub fn mutations(&self) -> u64 {
        self.inner.lock().mutations
    }

    /// Activations delivered directly to `node`.
    pub fn clicks(&self, node: NodeId) -> u32 {
        let g = self.inner.lock();
        g.live(node).map_or(0, |i| g.nodes[i].clicks)
    }

    /// First attached element whose `id` attribute equals `id`.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        let g = self.inner.lock();
        g.nodes
            .iter()
            .enumerate()
            .find(|(_, n)| n.attached && n.attrs.iter().any(|(k, v)| k == "id" && v == id))
            .map(|(i, _)| NodeId::new(i as u64))
    }
}

impl HostTree for MemoryHost {
    fn document(&self) -> NodeId {
        NodeId::new(0)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        let g = self.inner.lock();
        let i = g.live(node)?;
        g.nodes[i].parent.map(|p| NodeId::new(p as u64))
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        let g = self.inner.lock();
        g.live(node).map_or_else(Vec::new, |i| {
            g.nodes[i]
                .children
                .iter()
                .map(|&c| NodeId::new(c as u64))
                .collect()
        })
    }

    fn tag(&self, node: NodeId) -> Option<String> {
        let g = self.inner.lock();
        g.live(node).map(|i| g.nodes[i].tag.clone())
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        let g = self.inner.lock();
        let i = g.live(node)?;
        g.nodes[i]
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn classes(&self, node: NodeId) -> Vec<String> {
        let g = self.inner.lock();
        g.live(node)
            .map_or_else(Vec::new, |i| g.nodes[i].classes.clone())
    }

    fn text(&self, node: NodeId) -> String {
        let g = self.inner.lock();
        let mut out = String::new();
        if let Some(i) = g.live(node) {
            g.collect_text(i, &mut out);
        }
        out
    }

    fn display(&self, node: NodeId) -> Display {
        let g = self.inner.lock();
        g.live(node).map_or(Display::Default, |i| g.nodes[i].display)
    }

    fn set_display(&self, node: NodeId, display: Display) -> Result<()> {
        let mut g = self.inner.lock();
        let i = g.live_or_err(node)?;
        g.mutations += 1;
        g.nodes[i].display = display;
        Ok(())
    }

    fn set_class(&self, node: NodeId, class: &str, on: bool) -> Result<()> {
        let mut g = self.inner.lock();
        let i = g.live_or_err(node)?;
        g.mutations += 1;
        let n = &mut g.nodes[i];
        if n.pinned {
            return Ok(());
        }
        let has = n.classes.iter().any(|c| c == class);
        if on && !has {
            n.classes.push(class.to_string());
        } else if !on && has {
            n.classes.retain(|c| c != class);
        }
        Ok(())
    }

    fn clear_inline_height(&self, node: NodeId) -> Result<()> {
        let mut g = self.inner.lock();
        let i = g.live_or_err(node)?;
        g.mutations += 1;
        g.nodes[i].inline_height = false;
        Ok(())
    }

    fn append_child(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let mut g = self.inner.lock();
        let p = g.live_or_err(parent)?;
        let c = g.live_or_err(child)?;
        if g.is_inclusive_ancestor(c, p) {
            return Err(HostError::Cycle { child, parent });
        }
        g.mutations += 1;
        g.unlink(c);
        g.nodes[c].parent = Some(p);
        g.nodes[p].children.push(c);
        Ok(())
    }

    fn dispatch_click(&self, node: NodeId) -> Result<()> {
        let mut g = self.inner.lock();
        let i = g.live_or_err(node)?;
        if !g.dispatch_available {
            return Err(HostError::Unsupported {
                op: "dispatch_click",
                node,
            });
        }
        g.activate(i);
        Ok(())
    }

    fn click(&self, node: NodeId) -> Result<()> {
        let mut g = self.inner.lock();
        let i = g.live_or_err(node)?;
        g.activate(i);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build `doc > div > (button, section)` with the button bound to the section.
    fn toggle_pair(mode: ToggleMode) -> (MemoryHost, NodeId, NodeId) {
        let host = MemoryHost::new();
        let wrap = host.create(host.document(), "div").unwrap();
        let btn = host.create(wrap, "button").unwrap();
        host.set_attr(btn, EXPANDED_ATTR, "false").unwrap();
        let body = host.create(wrap, "section").unwrap();
        host.bind_toggle(btn, body, mode).unwrap();
        (host, btn, body)
    }

    #[test]
    fn immediate_toggle_flips_class_and_attr() {
        let (host, btn, body) = toggle_pair(ToggleMode::Immediate);
        host.click(btn).unwrap();
        assert!(host.has_class(body, OPEN_CLASS));
        assert_eq!(host.attr(btn, EXPANDED_ATTR).as_deref(), Some("true"));
        host.dispatch_click(btn).unwrap();
        assert!(!host.has_class(body, OPEN_CLASS));
        assert_eq!(host.clicks(btn), 2);
    }

    #[test]
    fn lagging_toggle_swallows_early_presses() {
        let (host, btn, body) = toggle_pair(ToggleMode::AfterClicks(3));
        host.click(btn).unwrap();
        host.click(btn).unwrap();
        assert!(!host.has_class(body, OPEN_CLASS));
        host.click(btn).unwrap();
        assert!(host.has_class(body, OPEN_CLASS));
    }

    #[test]
    fn clicks_bubble_to_bound_ancestor() {
        let (host, btn, body) = toggle_pair(ToggleMode::Immediate);
        let inner = host.create(btn, "p").unwrap();
        host.click(inner).unwrap();
        assert!(host.has_class(body, OPEN_CLASS));
        assert_eq!(host.clicks(inner), 1);
        assert_eq!(host.clicks(btn), 0);
    }

    #[test]
    fn dispatch_can_be_refused() {
        let (host, btn, _) = toggle_pair(ToggleMode::Immediate);
        host.set_dispatch_available(false);
        assert!(matches!(
            host.dispatch_click(btn),
            Err(HostError::Unsupported { .. })
        ));
    }

    #[test]
    fn pinned_nodes_ignore_class_writes() {
        let (host, _, body) = toggle_pair(ToggleMode::Never);
        host.pin_classes(body, true).unwrap();
        host.set_class(body, OPEN_CLASS, true).unwrap();
        assert!(!host.has_class(body, OPEN_CLASS));
        assert_eq!(host.mutations(), 1);
    }

    #[test]
    fn append_moves_and_rejects_cycles() {
        let host = MemoryHost::new();
        let root = host.create(host.document(), "ul").unwrap();
        let a = host.create(root, "li").unwrap();
        let b = host.create(root, "li").unwrap();
        host.append_child(root, a).unwrap();
        assert_eq!(host.children(root), vec![b, a]);
        assert!(matches!(
            host.append_child(a, root),
            Err(HostError::Cycle { .. })
        ));
    }

    #[test]
    fn removed_nodes_read_empty_and_refuse_writes() {
        let host = MemoryHost::new();
        let root = host.create(host.document(), "div").unwrap();
        let p = host.create(root, "p").unwrap();
        host.set_text(p, "Notes").unwrap();
        host.remove(root).unwrap();
        assert_eq!(host.tag(p), None);
        assert_eq!(host.text(p), "");
        assert_eq!(
            host.set_display(p, Display::Hidden),
            Err(HostError::Detached(p))
        );
        assert!(host.children(host.document()).is_empty());
    }
}
