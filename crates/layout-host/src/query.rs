//! Tree queries built on [`HostTree`] primitives.
//!
//! These mirror the DOM lookups the engine relies on: first/all matches under a
//! scope, inclusive ancestor search, and climbing to a direct child of a root.

use crate::{HostTree, NodeId, Selector};

/// True if `node` matches `sel`.
pub fn matches<H: HostTree + ?Sized>(host: &H, node: NodeId, sel: &Selector) -> bool {
    sel.matches(host, node)
}

/// All descendants of `scope` (excluding `scope`) in document order.
pub fn descendants<H: HostTree + ?Sized>(host: &H, scope: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = host.children(scope).into_iter().rev().collect();
    while let Some(n) = stack.pop() {
        out.push(n);
        stack.extend(host.children(n).into_iter().rev());
    }
    out
}

/// First descendant of `scope` matching `sel`, in document order.
pub fn select_first<H: HostTree + ?Sized>(
    host: &H,
    scope: NodeId,
    sel: &Selector,
) -> Option<NodeId> {
    let mut stack: Vec<NodeId> = host.children(scope).into_iter().rev().collect();
    while let Some(n) = stack.pop() {
        if sel.matches(host, n) {
            return Some(n);
        }
        stack.extend(host.children(n).into_iter().rev());
    }
    None
}

/// Every descendant of `scope` matching `sel`, in document order.
pub fn select_all<H: HostTree + ?Sized>(host: &H, scope: NodeId, sel: &Selector) -> Vec<NodeId> {
    descendants(host, scope)
        .into_iter()
        .filter(|&n| sel.matches(host, n))
        .collect()
}

/// Nearest inclusive ancestor of `node` matching `sel`.
pub fn closest<H: HostTree + ?Sized>(host: &H, node: NodeId, sel: &Selector) -> Option<NodeId> {
    let mut cur = Some(node);
    while let Some(n) = cur {
        if sel.matches(host, n) {
            return Some(n);
        }
        cur = host.parent(n);
    }
    None
}

/// Climb from `node` (inclusive) to the ancestor whose parent is `root`.
///
/// Returns `None` when `node` is not inside `root`, or when `node` is `root`.
pub fn climb_to_direct_child<H: HostTree + ?Sized>(
    host: &H,
    node: NodeId,
    root: NodeId,
) -> Option<NodeId> {
    let doc = host.document();
    let mut cur = node;
    loop {
        let parent = host.parent(cur)?;
        if parent == root {
            return Some(cur);
        }
        if parent == doc {
            return None;
        }
        cur = parent;
    }
}

/// Collapse runs of whitespace and trim.
pub fn normalize_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
