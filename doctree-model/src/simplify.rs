//! Invariant-restoring rewrite pass over the content tree.
//!
//! Producers (the markdown adapter, the substitution engine, external doc
//! analyzers) are allowed to build sloppy trees: empty text runs, generic
//! containers nested in containers, fragmented text. `simplify` repairs all
//! of that in place, bottom-up, so every consumer downstream can rely on:
//!
//! 1. no text node holds an empty string,
//! 2. no container is empty (list-item bodies get an empty paragraph
//!    instead, preserving item counts),
//! 3. no generic container directly contains another generic container,
//! 4. no two adjacent siblings are both text nodes.
//!
//! Table and collapsible-section substructures are repaired independently
//! with the same rules. The pass is idempotent; the pipeline applies it at
//! several stages and the second application must be a no-op.

use crate::nodes::Node;
use crate::walk::{for_each_child_list, ChildList};

/// Simplifies `node` and every descendant in place.
pub fn simplify(node: &mut Node) {
    for_each_child_list(node, &mut |list| match list {
        ChildList::Nodes(children) => simplify_sequence(children, false),
        ChildList::ItemBody(children) => simplify_sequence(children, true),
        ChildList::Summary(slot) => {
            if let Some(summary) = slot.as_deref_mut() {
                simplify(summary);
            }
            if slot.as_deref().map(is_prunable).unwrap_or(false) {
                *slot = None;
            }
        }
    });
}

/// Applies the three rewrite rules to one child sequence. Children are
/// simplified before the sequence itself is rewritten.
fn simplify_sequence(children: &mut Vec<Node>, item_body: bool) {
    for child in children.iter_mut() {
        simplify(child);
    }

    // Rule 1: splice one level of generic containers into this sequence.
    // The spliced children were already simplified, so they cannot
    // themselves be generic containers.
    if children.iter().any(|c| matches!(c, Node::Container(_))) {
        let mut flat = Vec::with_capacity(children.len());
        for child in children.drain(..) {
            match child {
                Node::Container(c) => flat.extend(c.children),
                other => flat.push(other),
            }
        }
        *children = flat;
    }

    // Rule 2: drop empty nodes. Inside a list-item body an empty child is
    // replaced by an empty paragraph so the item keeps its slot.
    if item_body {
        for child in children.iter_mut() {
            if is_prunable(child) {
                *child = Node::paragraph(Vec::new());
            }
        }
    } else {
        children.retain(|c| !is_prunable(c));
    }

    // Rule 3: merge adjacent text runs.
    if children.len() > 1 {
        let mut merged: Vec<Node> = Vec::with_capacity(children.len());
        for child in children.drain(..) {
            match (merged.last_mut(), child) {
                (Some(Node::Text(prev)), Node::Text(next)) => {
                    prev.value.push_str(&next.value);
                }
                (_, other) => merged.push(other),
            }
        }
        *children = merged;
    }
}

/// Whether a node counts as empty for rule 2.
///
/// Leaves other than text always carry meaning; an HTML element with no
/// children is a legitimate void tag and is kept.
fn is_prunable(node: &Node) -> bool {
    match node {
        Node::Text(t) => t.value.is_empty(),
        Node::Container(c) => c.children.is_empty(),
        Node::Paragraph(p) => p.children.is_empty(),
        Node::Heading(h) => h.children.is_empty(),
        Node::Bold(s)
        | Node::Italic(s)
        | Node::Strikethrough(s)
        | Node::Subscript(s)
        | Node::Superscript(s) => s.children.is_empty(),
        Node::LocalLink(l) => l.children.is_empty(),
        Node::ExternalLink(l) => l.children.is_empty(),
        Node::SourceLink(l) => l.children.is_empty(),
        // Embedded nodes are protocol wrappers, not content: an empty one
        // is a marker placeholder awaiting substitution and must survive.
        Node::List(l) => l.items.is_empty(),
        Node::Table(t) => t.header.cells.is_empty() && t.rows.is_empty(),
        Node::Collapsible(c) => c.summary.is_none() && c.children.is_empty(),
        _ => false,
    }
}
