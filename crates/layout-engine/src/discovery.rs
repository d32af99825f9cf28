//! Section discovery over the live host tree.
//!
//! Nothing here is cached: every call walks the tree as it is right now, so
//! callers re-run discovery before each action instead of holding handles.

use std::collections::HashSet;

use layout_host::{
    HostTree, NodeId,
    query::{climb_to_direct_child, closest, normalize_text, select_all, select_first},
};
use tracing::{debug, trace};

use crate::CompiledSelectors;

/// One recognized section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    /// Normalized title; the section's identity.
    pub title: String,
    /// Direct child of the sections root that moves and hides as a unit.
    pub container: NodeId,
    /// Accordion element enclosing the title marker.
    pub accordion: NodeId,
    /// Element whose activation flips the open state, when one exists.
    pub toggle: Option<NodeId>,
    /// Collapsible body, when one exists.
    pub body: Option<NodeId>,
}

/// The sections root, if the host has rendered it.
pub fn sections_root(host: &dyn HostTree, cues: &CompiledSelectors) -> Option<NodeId> {
    select_first(host, host.document(), &cues.list)
}

/// Discover sections in document order.
///
/// An empty result means "not ready yet". A container carries at most one
/// title and a title names at most one container; the first occurrence wins.
pub fn discover(host: &dyn HostTree, cues: &CompiledSelectors) -> Vec<Section> {
    let Some(root) = sections_root(host, cues) else {
        trace!("discover: no sections root");
        return Vec::new();
    };
    let mut containers = HashSet::new();
    let mut titles = HashSet::new();
    let mut out = Vec::new();
    for marker in select_all(host, root, &cues.title) {
        let title = normalize_text(&host.text(marker));
        if title.is_empty() {
            continue;
        }
        let Some(accordion) = closest(host, marker, &cues.accordion)
            .or_else(|| closest(host, marker, &cues.fallback_container))
        else {
            continue;
        };
        let Some(container) = climb_to_direct_child(host, accordion, root) else {
            trace!(%title, "discover: container outside root; ignored");
            continue;
        };
        if !containers.insert(container) || !titles.insert(title.clone()) {
            trace!(%title, "discover: duplicate; first occurrence wins");
            continue;
        }
        let toggle = find_toggle(host, cues, marker);
        let body = select_first(host, accordion, &cues.collapse)
            .or_else(|| select_first(host, container, &cues.collapse));
        out.push(Section {
            title,
            container,
            accordion,
            toggle,
            body,
        });
    }
    debug!(count = out.len(), "discover: sections");
    out
}

/// Fresh lookup of a single section by normalized title.
pub fn find_section(host: &dyn HostTree, cues: &CompiledSelectors, title: &str) -> Option<Section> {
    discover(host, cues).into_iter().find(|s| s.title == title)
}

/// Prioritized toggle search starting at the title marker.
fn find_toggle(host: &dyn HostTree, cues: &CompiledSelectors, marker: NodeId) -> Option<NodeId> {
    if let Some(t) = closest(host, marker, &cues.interactive) {
        return Some(t);
    }
    if let Some(t) = closest(host, marker, &cues.header) {
        return Some(t);
    }
    let area = closest(host, marker, &cues.header_area).or_else(|| host.parent(marker))?;
    select_first(host, area, &cues.interactive).or_else(|| closest(host, area, &cues.interactive))
}

/// Observed open state.
///
/// The toggle's expanded attribute wins when it says `true` or `false`;
/// otherwise the body's open class decides. No evidence reads as closed.
pub fn read_open(host: &dyn HostTree, cues: &CompiledSelectors, section: &Section) -> bool {
    if let Some(t) = section.toggle {
        match host.attr(t, &cues.expanded_attr).as_deref() {
            Some("true") => return true,
            Some("false") => return false,
            _ => {}
        }
    }
    let body = section
        .body
        .or_else(|| select_first(host, section.container, &cues.collapse));
    body.is_some_and(|b| host.has_class(b, &cues.open_class))
}

#[cfg(test)]
mod tests {
    use layout_host::{MemoryHost, host_from_ron};

    use super::*;
    use crate::EngineCfg;

    fn cues() -> CompiledSelectors {
        EngineCfg::default().compile().unwrap()
    }

    fn section(title: &str, expanded: Option<&str>, body_open: bool) -> String {
        let attrs = expanded
            .map(|v| format!(r#"attrs: [("aria-expanded", "{v}")],"#))
            .unwrap_or_default();
        let body_class = if body_open { r#"class: ["show"],"# } else { "" };
        format!(
            r#"(tag: "div", class: ["st-accordion", "accordion"], children: [
                (tag: "button", {attrs} children: [
                    (tag: "div", class: ["custom-accordion-header"], children: [
                        (tag: "p", text: "  {title}  "),
                    ]),
                ]),
                (tag: "div", {body_class} attrs: [("data-testid", "accordion-collapse")]),
            ])"#
        )
    }

    fn host(sections: &[String]) -> MemoryHost {
        host_from_ron(&format!(
            r#"(tag: "main", children: [
                (tag: "div", class: ["job-details-accordion-list"], children: [{}]),
            ])"#,
            sections.join(",")
        ))
        .unwrap()
    }

    #[test]
    fn missing_root_is_empty() {
        let h = host_from_ron(r#"(tag: "main")"#).unwrap();
        assert!(discover(&h, &cues()).is_empty());
    }

    #[test]
    fn titles_are_normalized_and_parts_resolved() {
        let h = host(&[section("Job  Items", Some("false"), false)]);
        let s = discover(&h, &cues());
        assert_eq!(s.len(), 1);
        assert_eq!(s[0].title, "Job Items");
        assert!(s[0].toggle.is_some());
        assert!(s[0].body.is_some());
        assert_eq!(h.parent(s[0].container), sections_root(&h, &cues()));
    }

    #[test]
    fn duplicate_titles_keep_first() {
        let h = host(&[
            section("Notes", None, false),
            section("Notes", None, true),
        ]);
        let s = discover(&h, &cues());
        assert_eq!(s.len(), 1);
        assert!(!read_open(&h, &cues(), &s[0]));
    }

    #[test]
    fn expanded_attr_beats_body_class() {
        let c = cues();
        let h = host(&[
            section("A", Some("false"), true),
            section("B", Some("true"), false),
            section("C", Some("maybe"), true),
            section("D", None, false),
        ]);
        let open: Vec<bool> = discover(&h, &c).iter().map(|s| read_open(&h, &c, s)).collect();
        assert_eq!(open, vec![false, true, true, false]);
    }

    #[test]
    fn toggle_found_inside_header_area() {
        let h = host_from_ron(
            r#"(tag: "div", class: ["job-details-accordion-list"], children: [
                (tag: "div", class: ["st-accordion", "accordion"], children: [
                    (tag: "div", class: ["custom-accordion-header"], children: [
                        (tag: "p", text: "Notes"),
                        (tag: "span", id: "t", attrs: [("role", "button")]),
                    ]),
                ]),
            ])"#,
        )
        .unwrap();
        let s = discover(&h, &cues());
        assert_eq!(s[0].toggle, h.find_by_id("t"));
        assert_eq!(s[0].body, None);
    }

    #[test]
    fn find_section_is_fresh() {
        let c = cues();
        let h = host(&[section("A", None, false), section("B", None, false)]);
        let b = find_section(&h, &c, "B").unwrap();
        h.remove(b.container).unwrap();
        assert!(find_section(&h, &c, "B").is_none());
        assert!(find_section(&h, &c, "A").is_some());
    }
}
