//! Core data structures for the documentation content tree.
//!
//! Every unit of page content is a [`Node`]: a closed tagged union of leaf
//! nodes (plain text, rules, images, anchors, code blocks) and container
//! nodes (styling wrappers, links, paragraphs, headings, lists, tables,
//! collapsible sections, pages). Dispatch anywhere in the pipeline is an
//! exhaustive `match` on the variant, so adding a node kind makes the
//! compiler flag every site that needs a case.
//!
//! Nodes are plain data: they derive serde with a `kind` tag and round-trip
//! through JSON unchanged. Construction never validates cross-field rules
//! (a table with an absurd column count is the producer's problem); the
//! constructors only fill in defaults such as empty child lists.

use serde::{Deserialize, Serialize};

use crate::toc::TocEntry;

/// A single unit of the content tree.
///
/// Variants are either leaves or containers; containers own their children
/// by value, so the tree is a strict ownership hierarchy with no parent
/// back-references. Replacing a node is always done through its parent's
/// child slot (see [`crate::walk`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Node {
    Text(Text),
    LineBreak,
    HorizontalRule,
    Image(Image),
    NamedAnchor(NamedAnchor),
    DoNotEdit,
    PageTitle(PageTitle),
    CodeSpan(CodeSpan),
    CodeBlock(CodeBlock),
    Container(Container),
    Paragraph(Paragraph),
    Heading(Heading),
    Bold(Styled),
    Italic(Styled),
    Strikethrough(Styled),
    Subscript(Styled),
    Superscript(Styled),
    LocalLink(LocalLink),
    ExternalLink(ExternalLink),
    SourceLink(SourceLink),
    List(List),
    Table(Table),
    Collapsible(Collapsible),
    HtmlElement(HtmlElement),
    Embedded(Embedded),
    Page(Page),
}

/// Plain text run. After simplification it is never empty and never has a
/// text sibling directly next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub value: String,
}

/// Raster image reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    pub alt: String,
}

/// Zero-width link target (`<a name="...">`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedAnchor {
    pub name: String,
}

/// Page title leaf; serializes as a level-1 heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageTitle {
    pub title: String,
}

/// Inline code run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeSpan {
    pub code: String,
}

/// Pre-rendered code block: an opaque string payload, not a container.
///
/// `links` optionally hyperlinks byte ranges of `code` without tokenizing
/// the code into nodes. Ranges must be ascending and non-overlapping; the
/// producer is responsible for keeping them that way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub language: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<CodeLink>,
}

/// A hyperlinked byte range inside a [`CodeBlock`] payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeLink {
    pub start: usize,
    pub end: usize,
    pub page_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
}

/// Generic grouping container with no formatting meaning of its own.
/// Simplification flattens it out of any parent child list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub children: Vec<Node>,
}

/// Heading, levels 1-6. `anchor` carries an author-supplied `{#id}` suffix
/// stripped from the heading text by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
}

/// Child payload shared by the inline styling wrappers (bold, italic,
/// strikethrough, sub/superscript).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Styled {
    pub children: Vec<Node>,
}

/// Link to another generated page, addressed by page id plus optional
/// anchor fragment. The serializer resolves the id to a path relative to
/// the page being rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalLink {
    pub page_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    pub children: Vec<Node>,
}

/// Link to an absolute external URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalLink {
    pub url: String,
    pub children: Vec<Node>,
}

/// Link into the source repository for a documented item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceLink {
    pub url: String,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub ordered: bool,
    pub start: u64,
    pub items: Vec<ListItem>,
}

/// One list slot. Unlike other containers an item is never removed for
/// being empty; simplification gives it an empty paragraph instead so the
/// item count survives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub children: Vec<Node>,
}

/// Table: one header row plus body rows. Both are always present, possibly
/// with zero cells; no column-count rule is enforced at this layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub header: TableRow,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub children: Vec<Node>,
}

/// Disclosure section: an optional single summary node plus the disclosed
/// body sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collapsible {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Box<Node>>,
    pub children: Vec<Node>,
}

/// Raw HTML element carried through from authored Markdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HtmlElement {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// A rich subtree temporarily represented by an opaque marker so it can
/// survive a flatten-and-reparse round trip (see the substitution engine
/// in the markdown crate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedded {
    pub marker: String,
    pub children: Vec<Node>,
}

/// Root container for one renderable document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Unique, path-shaped page identifier, e.g. `docs/api/widget`.
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toc: Option<Vec<TocEntry>>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn text(value: impl Into<String>) -> Node {
        Node::Text(Text {
            value: value.into(),
        })
    }

    pub fn image(src: impl Into<String>, alt: impl Into<String>) -> Node {
        Node::Image(Image {
            src: src.into(),
            alt: alt.into(),
        })
    }

    pub fn named_anchor(name: impl Into<String>) -> Node {
        Node::NamedAnchor(NamedAnchor { name: name.into() })
    }

    pub fn page_title(title: impl Into<String>) -> Node {
        Node::PageTitle(PageTitle {
            title: title.into(),
        })
    }

    pub fn code_span(code: impl Into<String>) -> Node {
        Node::CodeSpan(CodeSpan { code: code.into() })
    }

    pub fn code_block(language: impl Into<String>, code: impl Into<String>) -> Node {
        Node::CodeBlock(CodeBlock {
            language: language.into(),
            code: code.into(),
            links: Vec::new(),
        })
    }

    pub fn container(children: Vec<Node>) -> Node {
        Node::Container(Container { children })
    }

    pub fn paragraph(children: Vec<Node>) -> Node {
        Node::Paragraph(Paragraph { children })
    }

    pub fn heading(level: u8, children: Vec<Node>) -> Node {
        Node::Heading(Heading {
            level,
            children,
            anchor: None,
        })
    }

    pub fn bold(children: Vec<Node>) -> Node {
        Node::Bold(Styled { children })
    }

    pub fn italic(children: Vec<Node>) -> Node {
        Node::Italic(Styled { children })
    }

    pub fn strikethrough(children: Vec<Node>) -> Node {
        Node::Strikethrough(Styled { children })
    }

    pub fn subscript(children: Vec<Node>) -> Node {
        Node::Subscript(Styled { children })
    }

    pub fn superscript(children: Vec<Node>) -> Node {
        Node::Superscript(Styled { children })
    }

    pub fn local_link(
        page_id: impl Into<String>,
        anchor: Option<String>,
        children: Vec<Node>,
    ) -> Node {
        Node::LocalLink(LocalLink {
            page_id: page_id.into(),
            anchor,
            children,
        })
    }

    pub fn external_link(url: impl Into<String>, children: Vec<Node>) -> Node {
        Node::ExternalLink(ExternalLink {
            url: url.into(),
            children,
        })
    }

    pub fn source_link(url: impl Into<String>, children: Vec<Node>) -> Node {
        Node::SourceLink(SourceLink {
            url: url.into(),
            children,
        })
    }

    pub fn list(ordered: bool, start: u64, items: Vec<ListItem>) -> Node {
        Node::List(List {
            ordered,
            start,
            items,
        })
    }

    pub fn table(header: TableRow, rows: Vec<TableRow>) -> Node {
        Node::Table(Table { header, rows })
    }

    pub fn collapsible(summary: Option<Node>, children: Vec<Node>) -> Node {
        Node::Collapsible(Collapsible {
            summary: summary.map(Box::new),
            children,
        })
    }

    pub fn html_element(
        tag: impl Into<String>,
        attributes: Vec<(String, String)>,
        children: Vec<Node>,
    ) -> Node {
        Node::HtmlElement(HtmlElement {
            tag: tag.into(),
            attributes,
            children,
        })
    }

    pub fn embedded(marker: impl Into<String>, children: Vec<Node>) -> Node {
        Node::Embedded(Embedded {
            marker: marker.into(),
            children,
        })
    }

    /// The discriminant name, matching the serialized `kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Text(_) => "text",
            Node::LineBreak => "lineBreak",
            Node::HorizontalRule => "horizontalRule",
            Node::Image(_) => "image",
            Node::NamedAnchor(_) => "namedAnchor",
            Node::DoNotEdit => "doNotEdit",
            Node::PageTitle(_) => "pageTitle",
            Node::CodeSpan(_) => "codeSpan",
            Node::CodeBlock(_) => "codeBlock",
            Node::Container(_) => "container",
            Node::Paragraph(_) => "paragraph",
            Node::Heading(_) => "heading",
            Node::Bold(_) => "bold",
            Node::Italic(_) => "italic",
            Node::Strikethrough(_) => "strikethrough",
            Node::Subscript(_) => "subscript",
            Node::Superscript(_) => "superscript",
            Node::LocalLink(_) => "localLink",
            Node::ExternalLink(_) => "externalLink",
            Node::SourceLink(_) => "sourceLink",
            Node::List(_) => "list",
            Node::Table(_) => "table",
            Node::Collapsible(_) => "collapsible",
            Node::HtmlElement(_) => "htmlElement",
            Node::Embedded(_) => "embedded",
            Node::Page(_) => "page",
        }
    }
}

impl TableRow {
    pub fn new(cells: Vec<TableCell>) -> TableRow {
        TableRow { cells }
    }
}

impl TableCell {
    pub fn new(children: Vec<Node>) -> TableCell {
        TableCell { children }
    }
}

impl ListItem {
    pub fn new(children: Vec<Node>) -> ListItem {
        ListItem { children }
    }
}

impl Page {
    pub fn new(id: impl Into<String>, title: impl Into<String>, children: Vec<Node>) -> Page {
        Page {
            id: id.into(),
            title: title.into(),
            toc: None,
            children,
        }
    }
}
