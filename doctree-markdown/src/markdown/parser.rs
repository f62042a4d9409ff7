//! Markdown parsing (Markdown → content tree import)
//!
//! Converts the supported CommonMark dialect into the doctree node model.
//! Pipeline: Markdown string → comrak AST → lowering → simplified tree.
//!
//! The lowering is the explicit conversion step between comrak's own node
//! union and the broad [`Node`] union: every comrak node kind either maps
//! to a model node, redirects into an open raw-HTML element, or is a hard
//! error. Raw HTML is not interpreted here beyond tag structure: chunks
//! are fed to one incremental html5ever tokenizer (see [`raw_html`]) and
//! open tags collect the Markdown nodes that follow them until the close
//! tag chunk arrives.

use comrak::nodes::{AstNode, NodeValue};
use comrak::{parse_document, Arena, ComrakOptions};
use regex::Regex;

use doctree_model::{simplify, HtmlElement, ListItem, Node, TableCell, TableRow};

use super::raw_html::{self, HtmlStream};
use crate::error::FormatError;

use html5ever::tokenizer::{TagKind, Token};

/// Options for [`parse`].
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// When the very first block is a paragraph starting at line 1 column
    /// 1, splice its children directly into the root instead of keeping
    /// the paragraph wrapper. Used when re-parsing inline content so that
    /// leading text does not grow a spurious paragraph boundary.
    pub unwrap_first_paragraph: bool,
}

/// Result of parsing one Markdown source.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    /// Key/value pairs from a leading YAML block, if one was present.
    /// Consumers validate the shape themselves; only string-keyed records
    /// are representable.
    pub frontmatter: Option<Vec<(String, String)>>,
    /// A generic container holding the lowered, simplified content.
    pub root: Node,
}

/// Parse Markdown source into a simplified content tree.
pub fn parse(source: &str, options: &ParseOptions) -> Result<ParsedDocument, FormatError> {
    parse_with_comment_hook(source, options, &mut |_| None)
}

/// Like [`parse`], but routes every HTML comment through `on_comment`.
///
/// Returning `Some(node)` injects the node at the comment's position;
/// returning `None` discards the comment. The embedded-node substitution
/// engine uses this channel to resurface its markers.
pub fn parse_with_comment_hook(
    source: &str,
    options: &ParseOptions,
    on_comment: &mut dyn FnMut(&str) -> Option<Node>,
) -> Result<ParsedDocument, FormatError> {
    let arena = Arena::new();
    let root = parse_document(&arena, source, &markdown_options());

    let unwrap_first = options.unwrap_first_paragraph
        && root
            .children()
            .next()
            .map(|first| {
                let data = first.data.borrow();
                matches!(data.value, NodeValue::Paragraph)
                    && data.sourcepos.start.line == 1
                    && data.sourcepos.start.column == 1
            })
            .unwrap_or(false);

    let mut lowerer = Lowerer::new(source, on_comment);
    let mut children = lowerer.lower_document(root)?;

    if unwrap_first {
        if let Some(Node::Paragraph(_)) = children.first() {
            if let Node::Paragraph(first) = children.remove(0) {
                let mut spliced = first.children;
                spliced.append(&mut children);
                children = spliced;
            }
        }
    }

    let mut root_node = Node::container(children);
    simplify(&mut root_node);

    Ok(ParsedDocument {
        frontmatter: lowerer.frontmatter,
        root: root_node,
    })
}

fn markdown_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.superscript = true;
    options.extension.autolink = true;
    // Footnotes are parsed only so the lowering can reject them with a
    // useful fragment instead of emitting literal bracket soup.
    options.extension.footnotes = true;
    options.extension.front_matter_delimiter = Some("---".to_string());
    options
}

struct Lowerer<'s, 'h> {
    source: &'s str,
    html: HtmlStream,
    on_comment: &'h mut dyn FnMut(&str) -> Option<Node>,
    frontmatter: Option<Vec<(String, String)>>,
    heading_anchor: Regex,
}

/// Appends a completed node to the innermost open raw-HTML element, or to
/// the sequence being built when no element is open.
fn push_node(out: &mut Vec<Node>, open: &mut Vec<HtmlElement>, node: Node) {
    if let Some(top) = open.last_mut() {
        top.children.push(node);
    } else {
        out.push(node);
    }
}

impl<'s, 'h> Lowerer<'s, 'h> {
    fn new(source: &'s str, on_comment: &'h mut dyn FnMut(&str) -> Option<Node>) -> Self {
        Lowerer {
            source,
            html: HtmlStream::new(),
            on_comment,
            frontmatter: None,
            heading_anchor: Regex::new(r"\s*\{#([A-Za-z][A-Za-z0-9_-]*)\}\s*$")
                .expect("heading anchor pattern is valid"),
        }
    }

    fn lower_document<'a>(&mut self, root: &'a AstNode<'a>) -> Result<Vec<Node>, FormatError> {
        let mut out = Vec::new();
        let mut open: Vec<HtmlElement> = Vec::new();
        for child in root.children() {
            self.lower_node(child, &mut out, &mut open)?;
        }
        for token in self.html.finish() {
            self.apply_html_token(token, "", &mut out, &mut open)?;
        }
        if let Some(unclosed) = open.last() {
            return Err(FormatError::UnmatchedHtmlTag(unclosed.tag.clone()));
        }
        Ok(out)
    }

    /// Lowers a run of sibling comrak nodes into a fresh sequence. Raw
    /// HTML elements opened inside the run must close inside it.
    fn lower_siblings<'a>(
        &mut self,
        children: impl Iterator<Item = &'a AstNode<'a>>,
    ) -> Result<Vec<Node>, FormatError> {
        let mut out = Vec::new();
        let mut open: Vec<HtmlElement> = Vec::new();
        for child in children {
            self.lower_node(child, &mut out, &mut open)?;
        }
        if let Some(unclosed) = open.last() {
            return Err(FormatError::UnmatchedHtmlTag(unclosed.tag.clone()));
        }
        Ok(out)
    }

    fn lower_node<'a>(
        &mut self,
        node: &'a AstNode<'a>,
        out: &mut Vec<Node>,
        open: &mut Vec<HtmlElement>,
    ) -> Result<(), FormatError> {
        let value = node.data.borrow().value.clone();
        match &value {
            NodeValue::FrontMatter(block) => {
                if self.frontmatter.is_some() {
                    return Err(self.unsupported("second front matter block", node));
                }
                self.frontmatter = Some(parse_frontmatter(block));
            }

            NodeValue::Paragraph => {
                let children = self.lower_siblings(node.children())?;
                push_node(out, open, Node::paragraph(children));
            }

            NodeValue::Heading(heading) => {
                let mut children = self.lower_siblings(node.children())?;
                let anchor = self.extract_heading_anchor(&mut children);
                let mut lowered = Node::heading(heading.level, children);
                if let Node::Heading(h) = &mut lowered {
                    h.anchor = anchor;
                }
                push_node(out, open, lowered);
            }

            NodeValue::List(list) => {
                let ordered = matches!(list.list_type, comrak::nodes::ListType::Ordered);
                let mut items = Vec::new();
                for item_node in node.children() {
                    let item_value = item_node.data.borrow().value.clone();
                    match item_value {
                        NodeValue::Item(_) => {
                            items.push(ListItem::new(self.lower_siblings(item_node.children())?));
                        }
                        _ => return Err(self.unsupported("non-item list child", item_node)),
                    }
                }
                push_node(out, open, Node::list(ordered, list.start as u64, items));
            }

            NodeValue::Item(_) => {
                return Err(self.unsupported("list item outside a list", node));
            }

            NodeValue::CodeBlock(block) => {
                push_node(
                    out,
                    open,
                    Node::code_block(block.info.clone(), block.literal.clone()),
                );
            }

            NodeValue::ThematicBreak => {
                push_node(out, open, Node::HorizontalRule);
            }

            NodeValue::Table(_) => {
                let mut header: Option<TableRow> = None;
                let mut rows = Vec::new();
                for row_node in node.children() {
                    let row_value = row_node.data.borrow().value.clone();
                    match row_value {
                        NodeValue::TableRow(is_header) => {
                            let row = self.lower_table_row(row_node)?;
                            if is_header && header.is_none() {
                                header = Some(row);
                            } else {
                                rows.push(row);
                            }
                        }
                        _ => return Err(self.unsupported("non-row table child", row_node)),
                    }
                }
                push_node(
                    out,
                    open,
                    Node::table(header.unwrap_or_else(|| TableRow::new(Vec::new())), rows),
                );
            }

            NodeValue::TableRow(_) | NodeValue::TableCell => {
                return Err(self.unsupported("table fragment outside a table", node));
            }

            NodeValue::Text(text) => {
                push_node(out, open, Node::text(text.clone()));
            }

            NodeValue::SoftBreak => {
                push_node(out, open, Node::text(" "));
            }

            NodeValue::LineBreak => {
                // Trailing-double-space line breaks would make trailing
                // whitespace meaningful in the source of truth.
                return Err(self.unsupported("hard line break (trailing whitespace)", node));
            }

            NodeValue::Code(code) => {
                push_node(out, open, Node::code_span(code.literal.clone()));
            }

            NodeValue::Emph => {
                let children = self.lower_siblings(node.children())?;
                push_node(out, open, Node::italic(children));
            }

            NodeValue::Strong => {
                let children = self.lower_siblings(node.children())?;
                push_node(out, open, Node::bold(children));
            }

            NodeValue::Strikethrough => {
                let children = self.lower_siblings(node.children())?;
                push_node(out, open, Node::strikethrough(children));
            }

            NodeValue::Superscript => {
                let children = self.lower_siblings(node.children())?;
                push_node(out, open, Node::superscript(children));
            }

            NodeValue::Link(link) => {
                if link.url.is_empty() {
                    tracing::warn!(
                        fragment = %self.fragment_for(node),
                        "dropping link with no destination"
                    );
                    return Ok(());
                }
                let children = self.lower_siblings(node.children())?;
                push_node(out, open, Node::external_link(link.url.clone(), children));
            }

            NodeValue::Image(link) => {
                if link.url.is_empty() {
                    tracing::warn!(
                        fragment = %self.fragment_for(node),
                        "dropping image with no source"
                    );
                    return Ok(());
                }
                let mut alt = String::new();
                for child in node.children() {
                    collect_text(child, &mut alt);
                }
                push_node(out, open, Node::image(link.url.clone(), alt));
            }

            NodeValue::HtmlBlock(html) => {
                self.lower_html_chunk(&html.literal, out, open)?;
            }

            NodeValue::HtmlInline(chunk) => {
                self.lower_html_chunk(chunk, out, open)?;
            }

            NodeValue::FootnoteDefinition(_) | NodeValue::FootnoteReference(_) => {
                return Err(self.unsupported("footnote", node));
            }

            NodeValue::BlockQuote => {
                return Err(self.unsupported("block quote", node));
            }

            other => {
                // Defensive: the grammar is fixed by `markdown_options`, so
                // anything not handled above should be unreachable.
                let mut name = format!("{other:?}");
                name.truncate(48);
                return Err(self.unsupported(&name, node));
            }
        }

        Ok(())
    }

    fn lower_table_row<'a>(&mut self, row: &'a AstNode<'a>) -> Result<TableRow, FormatError> {
        let mut cells = Vec::new();
        for cell_node in row.children() {
            let cell_value = cell_node.data.borrow().value.clone();
            match cell_value {
                NodeValue::TableCell => {
                    cells.push(TableCell::new(self.lower_siblings(cell_node.children())?));
                }
                _ => return Err(self.unsupported("non-cell table row child", cell_node)),
            }
        }
        Ok(TableRow::new(cells))
    }

    fn lower_html_chunk(
        &mut self,
        chunk: &str,
        out: &mut Vec<Node>,
        open: &mut Vec<HtmlElement>,
    ) -> Result<(), FormatError> {
        for token in self.html.feed(chunk) {
            self.apply_html_token(token, chunk, out, open)?;
        }
        Ok(())
    }

    fn apply_html_token(
        &mut self,
        token: Token,
        chunk: &str,
        out: &mut Vec<Node>,
        open: &mut Vec<HtmlElement>,
    ) -> Result<(), FormatError> {
        match token {
            Token::TagToken(tag) => {
                let name = tag.name.to_string();
                match tag.kind {
                    TagKind::StartTag => {
                        let attributes = tag
                            .attrs
                            .iter()
                            .map(|a| (a.name.local.to_string(), a.value.to_string()))
                            .collect();
                        if tag.self_closing || raw_html::is_void_tag(&name) {
                            push_node(out, open, Node::html_element(name, attributes, Vec::new()));
                        } else {
                            open.push(HtmlElement {
                                tag: name,
                                attributes,
                                children: Vec::new(),
                            });
                        }
                    }
                    TagKind::EndTag => match open.pop() {
                        Some(element) if element.tag == name => {
                            push_node(out, open, Node::HtmlElement(element));
                        }
                        Some(element) => {
                            return Err(FormatError::UnmatchedHtmlTag(format!(
                                "</{name}> closes <{}>",
                                element.tag
                            )));
                        }
                        None => {
                            return Err(FormatError::UnmatchedHtmlTag(format!(
                                "</{name}> has no open tag"
                            )));
                        }
                    },
                }
            }

            Token::CommentToken(text) => {
                if let Some(node) = (self.on_comment)(&text) {
                    push_node(out, open, node);
                }
            }

            Token::CharacterTokens(text) => {
                // Whitespace between block-level tags is layout, not content.
                if !text.trim().is_empty() {
                    push_node(out, open, Node::text(text.to_string()));
                }
            }

            Token::DoctypeToken(_) => {
                return Err(FormatError::UnsupportedSyntax {
                    construct: "doctype declaration".to_string(),
                    fragment: chunk.trim().to_string(),
                });
            }

            Token::NullCharacterToken | Token::EOFToken | Token::ParseError(_) => {}
        }

        Ok(())
    }

    /// Strips a trailing `{#identifier}` from the heading text and returns
    /// the identifier as the heading's explicit anchor id.
    fn extract_heading_anchor(&self, children: &mut Vec<Node>) -> Option<String> {
        let found = match children.last() {
            Some(Node::Text(text)) => self
                .heading_anchor
                .captures(&text.value)
                .map(|c| (c.get(0).map(|m| m.start()).unwrap_or(0), c[1].to_string())),
            _ => None,
        };
        let (cut, anchor) = found?;
        if let Some(Node::Text(text)) = children.last_mut() {
            text.value.truncate(cut);
            if text.value.is_empty() {
                children.pop();
            }
        }
        Some(anchor)
    }

    fn unsupported(&self, construct: &str, node: &AstNode<'_>) -> FormatError {
        FormatError::UnsupportedSyntax {
            construct: construct.to_string(),
            fragment: self.fragment_for(node),
        }
    }

    fn fragment_for(&self, node: &AstNode<'_>) -> String {
        let line = node.data.borrow().sourcepos.start.line;
        self.source
            .lines()
            .nth(line.saturating_sub(1))
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

fn collect_text<'a>(node: &'a AstNode<'a>, out: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(text) => out.push_str(text),
        NodeValue::Code(code) => out.push_str(&code.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => out.push(' '),
        _ => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
    }
}

/// Deliberately naive YAML parsing: one `key: value` pair per line, quotes
/// stripped. Anything richer belongs to the consumer, which validates the
/// record shape itself.
fn parse_frontmatter(block: &str) -> Vec<(String, String)> {
    let body = block
        .trim()
        .trim_start_matches("---")
        .trim_end_matches("---")
        .trim();

    let mut pairs = Vec::new();
    for line in body.lines() {
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim().to_string();
            if key.is_empty() {
                continue;
            }
            let value = value.trim().trim_matches('"').trim_matches('\'').to_string();
            pairs.push((key, value));
        }
    }
    pairs
}
