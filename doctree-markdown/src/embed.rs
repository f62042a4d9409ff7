//! Embedded-node substitution engine.
//!
//! Rich, already-typed nodes (a page link built from a structured doc
//! comment, say) sometimes have to live inside text that still needs a
//! full Markdown re-parse, because the same text may contain literal
//! Markdown written by a documentation author. Serializing the rich node
//! to Markdown and parsing it back would lose its typed identity, so the
//! engine runs a marker protocol instead:
//!
//! 1. each rich subtree is wrapped in an [`Embedded`] node carrying a
//!    session-unique marker,
//! 2. the surrounding content flattens to a string where embedded nodes
//!    contribute only their marker as an HTML comment (inert in every
//!    Markdown context) and text nodes contribute their literal text,
//! 3. the flat string is re-parsed with the parser's comment hook
//!    enabled,
//! 4. marker comments in the parsed tree are replaced, depth-first, by
//!    the original rich subtrees.
//!
//! Marker ids are scoped to an [`EmbedSession`] (random id plus a
//! monotonic counter), so concurrent pipelines can never collide. A
//! marker that survives with no registered node, or a registered node
//! whose marker never resurfaces, is a parser/serializer desync and
//! therefore fatal.

use std::collections::HashMap;

use regex::Regex;
use uuid::Uuid;

use doctree_model::{simplify, walk, Embedded, Node, Visit};

use crate::error::FormatError;
use crate::markdown::parser::{parse_with_comment_hook, ParseOptions};

/// Scope of marker uniqueness for one embedding pipeline.
pub struct EmbedSession {
    id: String,
    next_sequence: u64,
    marker_pattern: Regex,
}

impl EmbedSession {
    pub fn new() -> EmbedSession {
        EmbedSession::with_id(Uuid::new_v4().simple().to_string())
    }

    fn with_id(id: String) -> EmbedSession {
        let marker_pattern = Regex::new(&format!(
            r"^__EmbeddedNode-{}__:(\d+)$",
            regex::escape(&id)
        ))
        .expect("marker pattern is valid");
        EmbedSession {
            id,
            next_sequence: 0,
            marker_pattern,
        }
    }

    /// The random session identifier markers are scoped by.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Wraps a rich subtree in an embedded node with a fresh marker.
    pub fn embed(&mut self, children: Vec<Node>) -> Node {
        let marker = format!("__EmbeddedNode-{}__:{}", self.id, self.next_sequence);
        self.next_sequence += 1;
        Node::embedded(marker, children)
    }

    /// Re-parses an embedded node's flattened content as Markdown and
    /// splices the registered rich subtrees back in at their marker
    /// positions. On success the node's child list holds the final
    /// substituted tree and the marker wrappers below it are gone.
    pub fn expand(&self, node: &mut Node) -> Result<(), FormatError> {
        let (flat, mut registry) = match node {
            Node::Embedded(embedded) => flatten(std::mem::take(&mut embedded.children))?,
            other => {
                return Err(FormatError::InvariantViolation(format!(
                    "expand requires an embedded node, got {}",
                    other.kind()
                )))
            }
        };

        let options = ParseOptions {
            unwrap_first_paragraph: true,
        };
        let parsed = parse_with_comment_hook(&flat, &options, &mut |comment| {
            let trimmed = comment.trim();
            if self.marker_pattern.is_match(trimmed) {
                Some(Node::embedded(trimmed, Vec::new()))
            } else {
                None
            }
        })?;

        let mut children = match parsed.root {
            Node::Container(container) => container.children,
            other => {
                return Err(FormatError::InvariantViolation(format!(
                    "parser returned {} instead of a container",
                    other.kind()
                )))
            }
        };

        self.splice_placeholders(&mut children, &mut registry)?;
        if !registry.is_empty() {
            let mut lost: Vec<&str> = registry.keys().map(String::as_str).collect();
            lost.sort_unstable();
            return Err(FormatError::InvariantViolation(format!(
                "embedded markers never resurfaced after re-parse: {}",
                lost.join(", ")
            )));
        }

        if let Node::Embedded(embedded) = node {
            embedded.children = children;
        }
        simplify(node);
        Ok(())
    }

    /// Replaces every marker placeholder in the parsed tree with its
    /// registered subtree, resolving each subtree's own embedded
    /// descendants first so nesting is preserved.
    fn splice_placeholders(
        &self,
        children: &mut [Node],
        registry: &mut HashMap<String, Embedded>,
    ) -> Result<(), FormatError> {
        for child in children.iter_mut() {
            let mut failure: Option<FormatError> = None;
            walk(child, &mut |candidate| {
                let marker = match candidate {
                    Node::Embedded(placeholder)
                        if placeholder.children.is_empty()
                            && self.marker_pattern.is_match(&placeholder.marker) =>
                    {
                        placeholder.marker.clone()
                    }
                    _ => return Visit::Recurse,
                };
                match registry.remove(&marker) {
                    Some(rich) => {
                        let mut resolved = Node::Embedded(rich);
                        if let Err(err) = self.resolve_embedded(&mut resolved) {
                            failure = Some(err);
                            return Visit::Skip;
                        }
                        Visit::Replace(resolved)
                    }
                    None => {
                        failure = Some(FormatError::InvariantViolation(format!(
                            "marker comment {marker} has no registered embedded node"
                        )));
                        Visit::Skip
                    }
                }
            });
            if let Some(err) = failure {
                return Err(err);
            }
        }
        Ok(())
    }

    /// Depth-first resolution of one registered subtree. Content made of
    /// text and embedded nodes goes through the full re-parse; anything
    /// richer is resolved structurally. Either way the wrapper is
    /// unwrapped into a plain container for splicing.
    fn resolve_embedded(&self, node: &mut Node) -> Result<(), FormatError> {
        let flattenable = match node {
            Node::Embedded(embedded) => embedded
                .children
                .iter()
                .all(|c| matches!(c, Node::Text(_) | Node::Embedded(_))),
            other => {
                return Err(FormatError::InvariantViolation(format!(
                    "cannot resolve {} as an embedded node",
                    other.kind()
                )))
            }
        };

        if flattenable {
            self.expand(node)?;
        } else if let Node::Embedded(embedded) = node {
            for child in embedded.children.iter_mut() {
                let mut failure: Option<FormatError> = None;
                walk(child, &mut |candidate| {
                    if matches!(candidate, Node::Embedded(_)) {
                        if let Err(err) = self.resolve_embedded(candidate) {
                            failure = Some(err);
                        }
                        return Visit::Skip;
                    }
                    Visit::Recurse
                });
                if let Some(err) = failure {
                    return Err(err);
                }
            }
        }

        if let Node::Embedded(embedded) = node {
            let children = std::mem::take(&mut embedded.children);
            *node = Node::container(children);
        }
        Ok(())
    }
}

impl Default for EmbedSession {
    fn default() -> Self {
        EmbedSession::new()
    }
}

/// Flattens embedded-node content to the re-parse string, registering
/// each embedded child under its marker. Only text and embedded nodes can
/// appear here; anything else means a producer skipped the wrapping step.
fn flatten(children: Vec<Node>) -> Result<(String, HashMap<String, Embedded>), FormatError> {
    let mut flat = String::new();
    let mut registry = HashMap::new();
    for child in children {
        match child {
            Node::Text(text) => flat.push_str(&text.value),
            Node::Embedded(embedded) => {
                flat.push_str("<!--");
                flat.push_str(&embedded.marker);
                flat.push_str("-->");
                registry.insert(embedded.marker.clone(), embedded);
            }
            other => {
                return Err(FormatError::InvariantViolation(format!(
                    "cannot flatten {} into embedded content",
                    other.kind()
                )))
            }
        }
    }
    Ok((flat, registry))
}
