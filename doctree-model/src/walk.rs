//! Generic pre-order traversal over the content tree.
//!
//! The walker is the only place that knows about the non-uniform container
//! shapes (table header/rows, collapsible summary, list items); every other
//! pass sees a uniform stream of nodes. Replacement is expressed as the
//! parent overwriting a child slot, never as a pointer mutation on the
//! child, so ownership stays a strict tree.

use crate::nodes::Node;

/// Visitor verdict for one node.
pub enum Visit {
    /// Keep the node and descend into its children.
    Recurse,
    /// Keep the node but do not descend.
    Skip,
    /// Substitute this node in its parent's slot. The replacement is not
    /// descended into.
    Replace(Node),
}

/// One child sequence owned by a node, with enough shape information for
/// passes that treat list-item bodies specially.
pub enum ChildList<'a> {
    /// Ordinary ordered child sequence.
    Nodes(&'a mut Vec<Node>),
    /// The body of a single list item.
    ItemBody(&'a mut Vec<Node>),
    /// The optional summary slot of a collapsible section.
    Summary(&'a mut Option<Box<Node>>),
}

/// Calls `f` once for every child sequence directly owned by `node`,
/// in document order.
pub fn for_each_child_list(node: &mut Node, f: &mut dyn FnMut(ChildList<'_>)) {
    match node {
        Node::Text(_)
        | Node::LineBreak
        | Node::HorizontalRule
        | Node::Image(_)
        | Node::NamedAnchor(_)
        | Node::DoNotEdit
        | Node::PageTitle(_)
        | Node::CodeSpan(_)
        | Node::CodeBlock(_) => {}
        Node::Container(c) => f(ChildList::Nodes(&mut c.children)),
        Node::Paragraph(p) => f(ChildList::Nodes(&mut p.children)),
        Node::Heading(h) => f(ChildList::Nodes(&mut h.children)),
        Node::Bold(s)
        | Node::Italic(s)
        | Node::Strikethrough(s)
        | Node::Subscript(s)
        | Node::Superscript(s) => f(ChildList::Nodes(&mut s.children)),
        Node::LocalLink(l) => f(ChildList::Nodes(&mut l.children)),
        Node::ExternalLink(l) => f(ChildList::Nodes(&mut l.children)),
        Node::SourceLink(l) => f(ChildList::Nodes(&mut l.children)),
        Node::List(list) => {
            for item in &mut list.items {
                f(ChildList::ItemBody(&mut item.children));
            }
        }
        Node::Table(table) => {
            for cell in &mut table.header.cells {
                f(ChildList::Nodes(&mut cell.children));
            }
            for row in &mut table.rows {
                for cell in &mut row.cells {
                    f(ChildList::Nodes(&mut cell.children));
                }
            }
        }
        Node::Collapsible(section) => {
            f(ChildList::Summary(&mut section.summary));
            f(ChildList::Nodes(&mut section.children));
        }
        Node::HtmlElement(el) => f(ChildList::Nodes(&mut el.children)),
        Node::Embedded(e) => f(ChildList::Nodes(&mut e.children)),
        Node::Page(page) => f(ChildList::Nodes(&mut page.children)),
    }
}

/// Walks `node` and every structurally reachable descendant in pre-order.
///
/// `on_node` decides per node whether to recurse, stop descending, or
/// replace the node in its parent slot (for the root, the root binding
/// itself is overwritten).
pub fn walk(node: &mut Node, on_node: &mut dyn FnMut(&mut Node) -> Visit) {
    match on_node(node) {
        Visit::Skip => {}
        Visit::Replace(replacement) => *node = replacement,
        Visit::Recurse => {
            for_each_child_list(node, &mut |list| match list {
                ChildList::Nodes(children) | ChildList::ItemBody(children) => {
                    walk_children(children, on_node);
                }
                ChildList::Summary(slot) => {
                    if let Some(summary) = slot {
                        walk(summary, on_node);
                    }
                }
            });
        }
    }
}

/// Walks every node of a child sequence, preserving array order.
pub fn walk_children(children: &mut [Node], on_node: &mut dyn FnMut(&mut Node) -> Visit) {
    for child in children.iter_mut() {
        walk(child, on_node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{ListItem, TableCell, TableRow};

    fn kinds_in_order(node: &mut Node) -> Vec<&'static str> {
        let mut seen = Vec::new();
        walk(node, &mut |n| {
            seen.push(n.kind());
            Visit::Recurse
        });
        seen
    }

    #[test]
    fn preorder_covers_plain_children() {
        let mut tree = Node::paragraph(vec![
            Node::text("a"),
            Node::bold(vec![Node::text("b")]),
            Node::text("c"),
        ]);
        assert_eq!(
            kinds_in_order(&mut tree),
            vec!["paragraph", "text", "bold", "text", "text"]
        );
    }

    #[test]
    fn preorder_covers_table_and_collapsible_shapes() {
        let mut tree = Node::container(vec![
            Node::table(
                TableRow::new(vec![TableCell::new(vec![Node::text("h")])]),
                vec![TableRow::new(vec![TableCell::new(vec![Node::text("b")])])],
            ),
            Node::collapsible(
                Some(Node::text("summary")),
                vec![Node::paragraph(vec![Node::text("body")])],
            ),
        ]);
        assert_eq!(
            kinds_in_order(&mut tree),
            vec![
                "container",
                "table",
                "text",
                "text",
                "collapsible",
                "text",
                "paragraph",
                "text"
            ]
        );
    }

    #[test]
    fn skip_stops_descent() {
        let mut tree = Node::paragraph(vec![Node::bold(vec![Node::text("hidden")])]);
        let mut seen = Vec::new();
        walk(&mut tree, &mut |n| {
            seen.push(n.kind());
            if matches!(n, Node::Bold(_)) {
                Visit::Skip
            } else {
                Visit::Recurse
            }
        });
        assert_eq!(seen, vec!["paragraph", "bold"]);
    }

    #[test]
    fn replace_swaps_parent_slot() {
        let mut tree = Node::paragraph(vec![Node::text("old"), Node::text("keep")]);
        walk(&mut tree, &mut |n| match n {
            Node::Text(t) if t.value == "old" => Visit::Replace(Node::code_span("new")),
            _ => Visit::Recurse,
        });
        assert_eq!(
            tree,
            Node::paragraph(vec![Node::code_span("new"), Node::text("keep")])
        );
    }

    #[test]
    fn list_item_bodies_are_reachable() {
        let mut tree = Node::list(
            true,
            1,
            vec![
                ListItem::new(vec![Node::text("one")]),
                ListItem::new(vec![Node::text("two")]),
            ],
        );
        assert_eq!(kinds_in_order(&mut tree), vec!["list", "text", "text"]);
    }
}
