//! Layout applier: order and visibility in one synchronous pass.

use std::collections::{HashMap, HashSet};

use layout_host::{Display, HostTree, NodeId};
use layout_prefs::PreferenceStore;
use tracing::{debug, info, warn};

use crate::{
    CompiledSelectors,
    discovery::{Section, discover, sections_root},
};

/// What a single apply pass did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Effective order of the recognized sections.
    pub order: Vec<String>,
    /// At least one child of the root was actually moved.
    pub moved: bool,
    /// Containers whose display override changed.
    pub visibility_changes: usize,
    /// The stored order differed and was rewritten.
    pub normalized: bool,
}

/// Effective order: stored titles that still exist, then newly seen ones in
/// discovery order.
pub fn target_order(stored: &[String], sections: &[Section]) -> Vec<String> {
    let present: HashSet<&str> = sections.iter().map(|s| s.title.as_str()).collect();
    let mut seen = HashSet::new();
    let mut order: Vec<String> = stored
        .iter()
        .filter(|t| present.contains(t.as_str()) && seen.insert(t.as_str()))
        .cloned()
        .collect();
    for s in sections {
        if !seen.contains(s.title.as_str()) {
            order.push(s.title.clone());
        }
    }
    order
}

/// Reorder containers, apply hidden flags, and persist a normalized order.
///
/// Returns `None` when the host has not rendered any sections yet. The host is
/// only written where it differs from the target, so repeating the call on an
/// unchanged host performs no writes.
pub fn apply_order_and_visibility(
    host: &dyn HostTree,
    cues: &CompiledSelectors,
    store: &PreferenceStore,
) -> Option<ApplyReport> {
    let root = sections_root(host, cues)?;
    let mut prefs = store.load();
    let sections = discover(host, cues);
    if sections.is_empty() {
        debug!("apply: no sections yet");
        return None;
    }

    let order = target_order(&prefs.order, &sections);
    let by_title: HashMap<&str, &Section> =
        sections.iter().map(|s| (s.title.as_str(), s)).collect();
    let desired = desired_children(host, root, &order, &by_title);
    let moved = rearrange(host, root, &desired);

    let mut visibility_changes = 0;
    for s in &sections {
        let want = if prefs.is_hidden(&s.title) {
            Display::Hidden
        } else {
            Display::Default
        };
        if host.display(s.container) == want {
            continue;
        }
        match host.set_display(s.container, want) {
            Ok(()) => visibility_changes += 1,
            Err(e) => debug!(title = %s.title, error = %e, "apply: display write failed"),
        }
    }

    let normalized = prefs.order != order;
    if normalized {
        prefs.order = order.clone();
        match store.save(&prefs) {
            Ok(()) => info!(order = ?order, "apply: normalized stored order"),
            Err(e) => warn!(error = %e, "apply: could not persist normalized order"),
        }
    }

    debug!(?order, moved, visibility_changes, "apply: done");
    Some(ApplyReport {
        order,
        moved,
        visibility_changes,
        normalized,
    })
}

/// Recognized containers in `order`, then every other child in its current
/// relative order.
fn desired_children(
    host: &dyn HostTree,
    root: NodeId,
    order: &[String],
    by_title: &HashMap<&str, &Section>,
) -> Vec<NodeId> {
    let mut out: Vec<NodeId> = order
        .iter()
        .filter_map(|t| by_title.get(t.as_str()).map(|s| s.container))
        .collect();
    let recognized: HashSet<NodeId> = out.iter().copied().collect();
    out.extend(
        host.children(root)
            .into_iter()
            .filter(|c| !recognized.contains(c)),
    );
    out
}

/// Move children so `root` matches `desired`, touching only the suffix after
/// the longest already-correct prefix. Returns true if at least one move
/// took.
fn rearrange(host: &dyn HostTree, root: NodeId, desired: &[NodeId]) -> bool {
    let current = host.children(root);
    if current == desired {
        return false;
    }
    let keep = current
        .iter()
        .zip(desired)
        .take_while(|(a, b)| a == b)
        .count();
    let mut moved = false;
    for &child in &desired[keep..] {
        match host.append_child(root, child) {
            Ok(()) => moved = true,
            Err(e) => debug!(?child, error = %e, "apply: move failed"),
        }
    }
    moved
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use layout_host::{HostError, MemoryHost, Result as HostResult, host_from_ron};
    use layout_prefs::{MemoryBackend, Preferences};
    use proptest::prelude::*;

    use super::*;
    use crate::EngineCfg;

    fn section(title: &str, n: u64) -> Section {
        Section {
            title: title.into(),
            container: NodeId::new(n),
            accordion: NodeId::new(n),
            toggle: None,
            body: None,
        }
    }

    #[test]
    fn stored_first_then_new_in_discovery_order() {
        let found = [section("A", 1), section("B", 2), section("C", 3)];
        let stored = vec!["B".to_string(), "A".to_string()];
        assert_eq!(target_order(&stored, &found), vec!["B", "A", "C"]);
    }

    #[test]
    fn stale_and_repeated_titles_are_dropped() {
        let found = [section("A", 1), section("B", 2)];
        let stored = vec!["Gone".into(), "B".into(), "B".into()];
        assert_eq!(target_order(&stored, &found), vec!["B", "A"]);
    }

    #[test]
    fn empty_store_keeps_discovery_order() {
        let found = [section("X", 1), section("Y", 2)];
        assert_eq!(target_order(&[], &found), vec!["X", "Y"]);
    }

    /// Host whose list refuses every move.
    struct FrozenHost(MemoryHost);

    impl HostTree for FrozenHost {
        fn document(&self) -> NodeId {
            self.0.document()
        }
        fn parent(&self, node: NodeId) -> Option<NodeId> {
            self.0.parent(node)
        }
        fn children(&self, node: NodeId) -> Vec<NodeId> {
            self.0.children(node)
        }
        fn tag(&self, node: NodeId) -> Option<String> {
            self.0.tag(node)
        }
        fn attr(&self, node: NodeId, name: &str) -> Option<String> {
            self.0.attr(node, name)
        }
        fn classes(&self, node: NodeId) -> Vec<String> {
            self.0.classes(node)
        }
        fn text(&self, node: NodeId) -> String {
            self.0.text(node)
        }
        fn display(&self, node: NodeId) -> Display {
            self.0.display(node)
        }
        fn set_display(&self, node: NodeId, display: Display) -> HostResult<()> {
            self.0.set_display(node, display)
        }
        fn set_class(&self, node: NodeId, class: &str, on: bool) -> HostResult<()> {
            self.0.set_class(node, class, on)
        }
        fn clear_inline_height(&self, node: NodeId) -> HostResult<()> {
            self.0.clear_inline_height(node)
        }
        fn append_child(&self, _parent: NodeId, child: NodeId) -> HostResult<()> {
            Err(HostError::Unsupported {
                op: "append_child",
                node: child,
            })
        }
        fn dispatch_click(&self, node: NodeId) -> HostResult<()> {
            self.0.dispatch_click(node)
        }
        fn click(&self, node: NodeId) -> HostResult<()> {
            self.0.click(node)
        }
    }

    #[test]
    fn refused_moves_are_not_reported_as_moved() {
        let card = |t: &str| {
            format!(
                r#"(tag: "div", class: ["st-accordion", "accordion"], children: [
                    (tag: "div", class: ["custom-accordion-header"], children: [(tag: "p", text: "{t}")]),
                ])"#
            )
        };
        let host = FrozenHost(
            host_from_ron(&format!(
                r#"(tag: "div", class: ["job-details-accordion-list"], children: [{}, {}])"#,
                card("A"),
                card("B")
            ))
            .unwrap(),
        );
        let backend = Arc::new(MemoryBackend::new());
        let store = PreferenceStore::with_default_key(Box::new(backend.clone()));
        store
            .save(&Preferences {
                order: vec!["B".into(), "A".into()],
                ..Preferences::default()
            })
            .unwrap();
        let cues = EngineCfg::default().compile().unwrap();

        let r = apply_order_and_visibility(&host, &cues, &store).unwrap();
        assert_eq!(r.order, vec!["B", "A"]);
        assert!(!r.moved);
        assert_eq!(host.0.mutations(), 0);
    }

    /// Discovery order: a shuffled, duplicate-free subset of the title pool.
    fn discovery_orders() -> impl Strategy<Value = Vec<String>> {
        (0usize..7)
            .prop_map(|n| (0..n).map(|i| format!("S{i}")).collect::<Vec<_>>())
            .prop_shuffle()
    }

    /// Stored order: may repeat titles and name titles that are gone.
    fn stored_orders() -> impl Strategy<Value = Vec<String>> {
        let pool: Vec<String> = (0..9).map(|i| format!("S{i}")).collect();
        prop::collection::vec(prop::sample::select(pool), 0..12)
    }

    proptest! {
        #[test]
        fn target_order_is_complete_and_stable(found in discovery_orders(), stored in stored_orders()) {
            let sections: Vec<Section> = found
                .iter()
                .enumerate()
                .map(|(i, t)| section(t, i as u64 + 1))
                .collect();
            let order = target_order(&stored, &sections);

            let mut got = order.clone();
            got.sort();
            let mut want = found.clone();
            want.sort();
            prop_assert_eq!(got, want);

            let first_stored = |t: &String| stored.iter().position(|s| s == t);
            let split = order.iter().take_while(|t| first_stored(t).is_some()).count();
            let (kept, fresh) = order.split_at(split);
            prop_assert!(fresh.iter().all(|t| first_stored(t).is_none()));
            prop_assert!(kept.windows(2).all(|w| first_stored(&w[0]) < first_stored(&w[1])));
            let discovery_pos = |t: &String| found.iter().position(|f| f == t);
            prop_assert!(fresh.windows(2).all(|w| discovery_pos(&w[0]) < discovery_pos(&w[1])));
        }
    }
}
