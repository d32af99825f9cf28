mod common;

use common::{Page, Spec, prefs};
use layout_host::{Display, HostTree};
use proptest::prelude::*;

#[test]
fn stored_order_wins_and_new_titles_follow() {
    let page = Page::with_prefs(
        &[Spec::new("A"), Spec::new("B"), Spec::new("C")],
        Some(&prefs(&["B", "A"], &[], &[])),
    );
    let report = page.session.apply_order_and_visibility().unwrap();
    assert_eq!(report.order, vec!["B", "A", "C"]);
    assert!(report.moved);
    assert!(report.normalized);
    assert_eq!(page.host_order(), vec!["B", "A", "C"]);
    assert_eq!(page.session.store().load().order, vec!["B", "A", "C"]);
}

#[test]
fn second_apply_writes_nothing() {
    let page = Page::with_prefs(
        &[Spec::new("A"), Spec::new("B"), Spec::new("C")],
        Some(&prefs(&["C", "A"], &["B"], &[])),
    );
    page.session.apply_order_and_visibility().unwrap();
    let after_first = page.host.mutations();
    assert!(after_first > 0);

    let again = page.session.apply_order_and_visibility().unwrap();
    assert_eq!(page.host.mutations(), after_first);
    assert!(!again.moved);
    assert!(!again.normalized);
    assert_eq!(again.visibility_changes, 0);
}

#[test]
fn unrecognized_children_move_after_sections() {
    let page = Page::with_prefs(&[], Some(&prefs(&["B", "A"], &[], &[])));
    let spacer = page.host.create(page.list, "hr").unwrap();
    let a = common::add_section(&page.host, page.list, &Spec::new("A"));
    let b = common::add_section(&page.host, page.list, &Spec::new("B"));

    page.session.apply_order_and_visibility().unwrap();
    assert_eq!(
        page.host.children(page.list),
        vec![b.container, a.container, spacer]
    );
}

#[test]
fn hidden_flags_toggle_display() {
    let page = Page::with_prefs(
        &[Spec::new("A"), Spec::new("B")],
        Some(&prefs(&[], &["A"], &[])),
    );
    page.session.apply_order_and_visibility().unwrap();
    assert_eq!(page.host.display(page.part("A").container), Display::Hidden);
    assert_eq!(page.host.display(page.part("B").container), Display::Default);

    page.session
        .store()
        .save(&prefs(&["A", "B"], &[], &[]))
        .unwrap();
    let r = page.session.apply_order_and_visibility().unwrap();
    assert_eq!(r.visibility_changes, 1);
    assert_eq!(page.host.display(page.part("A").container), Display::Default);
}

#[test]
fn empty_host_is_not_ready() {
    let page = Page::new(&[]);
    assert!(page.session.apply_order_and_visibility().is_none());
    assert_eq!(page.host.mutations(), 0);
    assert!(page.session.store().load().order.is_empty());
}

#[test]
fn stale_titles_are_dropped_from_the_store() {
    let page = Page::with_prefs(
        &[Spec::new("A"), Spec::new("B")],
        Some(&prefs(&["Gone", "B"], &[], &[])),
    );
    page.session.apply_order_and_visibility().unwrap();
    assert_eq!(page.session.store().load().order, vec!["B", "A"]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn second_apply_is_inert_for_any_layout(
        count in 1usize..6,
        stored in prop::collection::vec(0usize..8, 0..10),
        hidden in prop::collection::vec(any::<bool>(), 6),
    ) {
        let titles: Vec<String> = (0..count).map(|i| format!("T{i}")).collect();
        let specs: Vec<Spec<'_>> = titles.iter().map(|t| Spec::new(t)).collect();
        let stored: Vec<String> = stored.iter().map(|i| format!("T{i}")).collect();
        let stored_refs: Vec<&str> = stored.iter().map(String::as_str).collect();
        let hidden_refs: Vec<&str> = titles
            .iter()
            .zip(&hidden)
            .filter(|(_, h)| **h)
            .map(|(t, _)| t.as_str())
            .collect();
        let page = Page::with_prefs(&specs, Some(&prefs(&stored_refs, &hidden_refs, &[])));

        let first = page.session.apply_order_and_visibility().unwrap();
        prop_assert_eq!(page.host_order(), first.order.clone());
        prop_assert_eq!(page.session.store().load().order, first.order);
        for t in &titles {
            let want = if hidden_refs.contains(&t.as_str()) {
                Display::Hidden
            } else {
                Display::Default
            };
            prop_assert_eq!(page.host.display(page.part(t).container), want);
        }

        let (mutations, writes) = (page.host.mutations(), page.backend.writes());
        let again = page.session.apply_order_and_visibility().unwrap();
        prop_assert_eq!(page.host.mutations(), mutations);
        prop_assert_eq!(page.backend.writes(), writes);
        prop_assert!(!again.moved);
        prop_assert!(!again.normalized);
        prop_assert_eq!(again.visibility_changes, 0);
    }
}
