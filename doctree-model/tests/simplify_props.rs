//! Property tests for the simplifier: idempotence and invariant closure
//! over arbitrarily messy trees.

use doctree_model::{
    for_each_child_list, simplify, ChildList, ListItem, Node, TableCell, TableRow,
};
use proptest::prelude::*;

fn arb_node() -> BoxedStrategy<Node> {
    let leaf = prop_oneof![
        "[ a-z]{0,6}".prop_map(|s: String| Node::text(s)),
        Just(Node::HorizontalRule),
        Just(Node::LineBreak),
        "[a-z]{1,4}".prop_map(|s: String| Node::code_span(s)),
    ];
    leaf.prop_recursive(4, 32, 6, |inner| {
        let children = prop::collection::vec(inner.clone(), 0..4);
        let row = prop::collection::vec(
            prop::collection::vec(inner.clone(), 0..3).prop_map(TableCell::new),
            0..3,
        )
        .prop_map(TableRow::new);
        prop_oneof![
            children.clone().prop_map(Node::container),
            children.clone().prop_map(Node::paragraph),
            children.clone().prop_map(Node::bold),
            children.clone().prop_map(Node::italic),
            prop::collection::vec(children.clone().prop_map(ListItem::new), 0..3)
                .prop_map(|items| Node::list(true, 1, items)),
            (row.clone(), prop::collection::vec(row, 0..2))
                .prop_map(|(header, rows)| Node::table(header, rows)),
            (proptest::option::of(inner.clone()), children)
                .prop_map(|(summary, body)| Node::collapsible(summary, body)),
        ]
        .boxed()
    })
    .boxed()
}

/// Empty-node predicate mirroring the simplifier's rule 2, restricted to
/// the variants the generator can produce.
fn is_empty_node(node: &Node) -> bool {
    match node {
        Node::Text(t) => t.value.is_empty(),
        Node::Container(c) => c.children.is_empty(),
        Node::Paragraph(p) => p.children.is_empty(),
        Node::Bold(s) | Node::Italic(s) => s.children.is_empty(),
        Node::List(l) => l.items.is_empty(),
        Node::Table(t) => t.header.cells.is_empty() && t.rows.is_empty(),
        Node::Collapsible(c) => c.summary.is_none() && c.children.is_empty(),
        _ => false,
    }
}

fn check_sequence(children: &mut Vec<Node>, item_body: bool) {
    for pair in children.windows(2) {
        assert!(
            !(matches!(pair[0], Node::Text(_)) && matches!(pair[1], Node::Text(_))),
            "adjacent text nodes survived simplification"
        );
    }
    for child in children.iter() {
        assert!(
            !matches!(child, Node::Container(_)),
            "generic container survived inside a child sequence"
        );
        let allowed_empty = item_body && matches!(child, Node::Paragraph(p) if p.children.is_empty());
        assert!(
            allowed_empty || !is_empty_node(child),
            "empty node survived simplification: {}",
            child.kind()
        );
    }
    for child in children.iter_mut() {
        check_node(child);
    }
}

fn check_node(node: &mut Node) {
    for_each_child_list(node, &mut |list| match list {
        ChildList::Nodes(children) => check_sequence(children, false),
        ChildList::ItemBody(children) => check_sequence(children, true),
        ChildList::Summary(slot) => {
            if let Some(summary) = slot.as_deref_mut() {
                assert!(!is_empty_node(summary), "empty summary survived");
                check_node(summary);
            }
        }
    });
}

proptest! {
    #[test]
    fn simplify_is_idempotent(mut tree in arb_node()) {
        simplify(&mut tree);
        let once = tree.clone();
        simplify(&mut tree);
        prop_assert_eq!(once, tree);
    }

    #[test]
    fn simplify_restores_invariants(mut tree in arb_node()) {
        simplify(&mut tree);
        check_node(&mut tree);
    }
}
