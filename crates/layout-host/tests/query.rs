use layout_host::{
    HostTree, MemoryHost, Selector,
    query::{climb_to_direct_child, closest, normalize_text, select_all, select_first},
};

fn page() -> MemoryHost {
    layout_host::host_from_ron(
        r#"(tag: "main", children: [
            (tag: "div", class: ["list"], children: [
                (tag: "div", id: "a", class: ["card", "accordion"], children: [
                    (tag: "button", attrs: [("role", "button")], children: [
                        (tag: "div", class: ["header"], children: [(tag: "p", text: "  First\n  card ")]),
                    ]),
                ]),
                (tag: "div", id: "b", class: ["card"], children: [
                    (tag: "div", class: ["header"], children: [(tag: "p", text: "Second")]),
                    (tag: "span", text: "not a title"),
                ]),
            ]),
            (tag: "div", class: ["header"], children: [(tag: "p", text: "Outside")]),
        ])"#,
    )
    .unwrap()
}

fn sel(s: &str) -> Selector {
    Selector::parse(s).unwrap()
}

#[test]
fn select_all_respects_scope_and_document_order() {
    let host = page();
    let list = select_first(&host, host.document(), &sel(".list")).unwrap();
    let titles: Vec<String> = select_all(&host, list, &sel(".header > p"))
        .into_iter()
        .map(|p| normalize_text(&host.text(p)))
        .collect();
    assert_eq!(titles, vec!["First card", "Second"]);

    let everywhere = select_all(&host, host.document(), &sel(".header > p"));
    assert_eq!(everywhere.len(), 3);
}

#[test]
fn descendant_combinator_crosses_levels() {
    let host = page();
    let hits = select_all(&host, host.document(), &sel(".list p"));
    assert_eq!(hits.len(), 2);
    let none = select_all(&host, host.document(), &sel(".list > p"));
    assert!(none.is_empty());
}

#[test]
fn closest_is_inclusive_and_prefers_nearest() {
    let host = page();
    let a = host.find_by_id("a").unwrap();
    let p = select_first(&host, a, &sel("p")).unwrap();
    let button = closest(&host, p, &sel("button,[role='button']")).unwrap();
    assert_eq!(host.tag(button).as_deref(), Some("button"));
    assert_eq!(closest(&host, a, &sel(".card")), Some(a));
    assert_eq!(closest(&host, p, &sel(".missing")), None);
}

#[test]
fn climb_stops_at_direct_child_of_root() {
    let host = page();
    let list = select_first(&host, host.document(), &sel(".list")).unwrap();
    let b = host.find_by_id("b").unwrap();
    let p = select_first(&host, b, &sel("p")).unwrap();
    assert_eq!(climb_to_direct_child(&host, p, list), Some(b));
    assert_eq!(climb_to_direct_child(&host, b, list), Some(b));
    assert_eq!(climb_to_direct_child(&host, list, list), None);

    let outside = select_all(&host, host.document(), &sel(".header > p"))
        .into_iter()
        .last()
        .unwrap();
    assert_eq!(climb_to_direct_child(&host, outside, list), None);
}
