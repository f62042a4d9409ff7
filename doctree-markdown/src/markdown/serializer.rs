//! Markdown serialization (content tree → Markdown/HTML-hybrid export)
//!
//! A context-tracking pretty-printer over the node model. Output is a
//! single append-only buffer; every formatting decision is made locally
//! from the current context flags plus the node's own variant, never by
//! looking ahead at unvisited siblings. The context tracks the indent
//! prefix applied after each newline, whether output is constrained to a
//! single line (table cells, link text), whether we are inside a raw HTML
//! tag or a table, and whether a blank-line separator is still owed.
//!
//! Where native Markdown syntax would be ambiguous or illegal in the
//! current context the writer falls back to the equivalent HTML element:
//! lists, code blocks and collapsible sections degrade to
//! `<ul>/<ol>`, `<pre>` and `<details>` in single-line contexts, links
//! degrade to `<a>` inside raw HTML (but not inside tables), and a code
//! block carrying hyperlink ranges is always emitted as `<pre>` because a
//! backtick fence cannot contain markup.

use doctree_model::{CodeBlock, Collapsible, List, Node, Page, Table, TocEntry};

use crate::common::escape::{code_span_width, escape_markdown, fence_width};
use crate::common::links::resolve_page_path;
use crate::error::FormatError;

use super::raw_html::is_void_tag;

/// Renders one page to its Markdown/HTML-hybrid text.
///
/// The page's own id is the base for every local link, so the same tree
/// renders differently depending on where it lives in the page hierarchy.
pub fn render_page(page: &Page) -> Result<String, FormatError> {
    let mut out = Output::new(&page.id);

    let mut pending_toc: Option<&[TocEntry]> = match &page.toc {
        Some(entries) if !entries.is_empty() => Some(entries),
        _ => None,
    };

    // The table of contents follows the page title when the page has one;
    // otherwise it opens the page.
    let has_title = page
        .children
        .iter()
        .any(|child| matches!(child, Node::PageTitle(_)));
    if !has_title {
        if let Some(toc) = pending_toc.take() {
            out.write_toc(toc)?;
        }
    }
    for child in &page.children {
        out.write_node(child)?;
        if matches!(child, Node::PageTitle(_)) {
            if let Some(toc) = pending_toc.take() {
                out.write_toc(toc)?;
            }
        }
    }

    out.ensure_new_line();
    Ok(out.buf)
}

/// Mutable formatting context for one render.
struct Output<'a> {
    buf: String,
    /// Prefix applied after every newline.
    indent: String,
    page_id: &'a str,
    single_line: bool,
    in_html_block: bool,
    in_table: bool,
    in_list_item: bool,
    /// Set right after a marker or opening tag: the next block starts a
    /// fresh slot and owes no separator.
    fresh_slot: bool,
}

impl<'a> Output<'a> {
    fn new(page_id: &'a str) -> Output<'a> {
        Output {
            buf: String::new(),
            indent: String::new(),
            page_id,
            single_line: false,
            in_html_block: false,
            in_table: false,
            in_list_item: false,
            fresh_slot: false,
        }
    }

    fn write(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                if self.single_line {
                    self.push_char(' ');
                } else {
                    self.buf.push('\n');
                }
            } else {
                self.push_char(ch);
            }
        }
    }

    fn push_char(&mut self, ch: char) {
        if (self.buf.is_empty() || self.buf.ends_with('\n')) && !self.indent.is_empty() {
            self.buf.push_str(&self.indent);
        }
        self.buf.push(ch);
        self.fresh_slot = false;
    }

    /// Verbatim text inside `<pre>`: no indent prefix, no escaping beyond
    /// HTML entities, newlines become `<br>` in single-line contexts.
    fn write_preformatted(&mut self, text: &str) {
        let escaped = self.encode_html_text(text);
        if self.single_line {
            self.buf.push_str(&escaped.replace('\n', "<br>"));
        } else {
            self.buf.push_str(&escaped);
        }
        self.fresh_slot = false;
    }

    /// Entity-escapes text for an HTML context. Inside a pipe table the `|`
    /// must be an entity too, or it would end the cell.
    fn encode_html_text(&self, text: &str) -> String {
        let escaped = html_escape::encode_text(text).into_owned();
        if self.in_table {
            escaped.replace('|', "&#124;")
        } else {
            escaped
        }
    }

    fn ensure_new_line(&mut self) {
        if !self.buf.is_empty() && !self.buf.ends_with('\n') {
            self.buf.push('\n');
        }
    }

    fn ensure_blank_line(&mut self) {
        self.ensure_new_line();
        if !self.buf.is_empty() && !self.buf.ends_with("\n\n") {
            self.buf.push('\n');
        }
    }

    /// Block scope: one blank line before the content when anything was
    /// already written, a newline owed after. In single-line contexts the
    /// separator degrades to a single space.
    fn with_paragraph_break<F>(&mut self, f: F) -> Result<(), FormatError>
    where
        F: FnOnce(&mut Self) -> Result<(), FormatError>,
    {
        if self.single_line {
            if !self.fresh_slot && !self.buf.is_empty() && !self.buf.ends_with(' ') {
                self.buf.push(' ');
            }
            return f(self);
        }
        if !self.fresh_slot {
            self.ensure_blank_line();
        }
        f(self)?;
        self.ensure_new_line();
        Ok(())
    }

    fn write_node(&mut self, node: &Node) -> Result<(), FormatError> {
        match node {
            Node::Text(text) => {
                let rendered = if self.in_html_block {
                    self.encode_html_text(&text.value)
                } else {
                    escape_markdown(&text.value)
                };
                self.write(&rendered);
            }

            Node::LineBreak => self.write("<br>"),

            Node::HorizontalRule => {
                self.with_paragraph_break(|out| {
                    out.write("---");
                    Ok(())
                })?;
            }

            Node::Image(image) => {
                if self.in_html_block {
                    self.write(&format!(
                        "<img src=\"{}\" alt=\"{}\">",
                        html_escape::encode_double_quoted_attribute(&image.src),
                        html_escape::encode_double_quoted_attribute(&image.alt),
                    ));
                } else {
                    self.write("![");
                    self.write(&escape_markdown(&image.alt));
                    self.write("](");
                    self.write(&image.src);
                    self.write(")");
                }
            }

            Node::NamedAnchor(anchor) => {
                self.write(&format!(
                    "<a name=\"{}\"></a>",
                    html_escape::encode_double_quoted_attribute(&anchor.name)
                ));
            }

            Node::DoNotEdit => {
                self.with_paragraph_break(|out| {
                    out.write("<!-- Do not edit this file. It is generated automatically. -->");
                    Ok(())
                })?;
            }

            Node::PageTitle(title) => {
                if self.single_line {
                    self.write("**");
                    self.write(&escape_markdown(&title.title));
                    self.write("**");
                } else {
                    self.with_paragraph_break(|out| {
                        out.write("# ");
                        out.write(&escape_markdown(&title.title));
                        Ok(())
                    })?;
                }
            }

            Node::CodeSpan(span) => {
                if self.in_html_block || (self.in_table && span.code.contains('|')) {
                    self.write("<code>");
                    self.write_preformatted(&span.code);
                    self.write("</code>");
                } else {
                    let delimiter = "`".repeat(code_span_width(&span.code));
                    let pad = span.code.starts_with('`') || span.code.ends_with('`');
                    self.write(&delimiter);
                    if pad {
                        self.write(" ");
                    }
                    self.write(&span.code);
                    if pad {
                        self.write(" ");
                    }
                    self.write(&delimiter);
                }
            }

            Node::CodeBlock(block) => {
                if self.single_line {
                    self.write_code_block_html(block)?;
                } else if !block.links.is_empty() {
                    self.with_paragraph_break(|out| out.write_code_block_html(block))?;
                } else {
                    self.with_paragraph_break(|out| {
                        let fence = "`".repeat(fence_width(&block.code));
                        out.write(&fence);
                        out.write(&block.language);
                        out.write("\n");
                        out.write(&block.code);
                        if !block.code.ends_with('\n') {
                            out.write("\n");
                        }
                        out.write(&fence);
                        Ok(())
                    })?;
                }
            }

            Node::Container(container) => {
                for child in &container.children {
                    self.write_node(child)?;
                }
            }

            Node::Paragraph(paragraph) => {
                self.with_paragraph_break(|out| {
                    for child in &paragraph.children {
                        out.write_node(child)?;
                    }
                    Ok(())
                })?;
            }

            Node::Heading(heading) => {
                if self.single_line {
                    self.write("**");
                    for child in &heading.children {
                        self.write_node(child)?;
                    }
                    self.write("**");
                } else {
                    self.with_paragraph_break(|out| {
                        out.write(&"#".repeat(heading.level.clamp(1, 6) as usize));
                        out.write(" ");
                        let saved = out.single_line;
                        out.single_line = true;
                        for child in &heading.children {
                            out.write_node(child)?;
                        }
                        out.single_line = saved;
                        if let Some(anchor) = &heading.anchor {
                            out.write(&format!(" {{#{anchor}}}"));
                        }
                        Ok(())
                    })?;
                }
            }

            Node::Bold(styled) => {
                self.write_inline_wrapper("**", "<b>", "</b>", &styled.children)?;
            }
            Node::Italic(styled) => {
                self.write_inline_wrapper("*", "<i>", "</i>", &styled.children)?;
            }
            Node::Strikethrough(styled) => {
                self.write_inline_wrapper("~~", "<s>", "</s>", &styled.children)?;
            }
            Node::Subscript(styled) => {
                // No Markdown syntax exists for these two; always HTML.
                self.write("<sub>");
                for child in &styled.children {
                    self.write_node(child)?;
                }
                self.write("</sub>");
            }
            Node::Superscript(styled) => {
                self.write("<sup>");
                for child in &styled.children {
                    self.write_node(child)?;
                }
                self.write("</sup>");
            }

            Node::LocalLink(link) => {
                let destination =
                    resolve_page_path(self.page_id, &link.page_id, link.anchor.as_deref());
                self.write_link(&destination, &link.children)?;
            }
            Node::ExternalLink(link) => {
                self.write_link(&link.url, &link.children)?;
            }
            Node::SourceLink(link) => {
                self.write_link(&link.url, &link.children)?;
            }

            Node::List(list) => {
                if self.single_line {
                    self.write_list_html(list)?;
                } else {
                    self.with_paragraph_break(|out| {
                        for (index, item) in list.items.iter().enumerate() {
                            out.ensure_new_line();
                            let marker = if list.ordered {
                                format!("{}. ", list.start + index as u64)
                            } else {
                                "- ".to_string()
                            };
                            out.write(&marker);
                            out.fresh_slot = true;
                            let saved_indent = out.indent.clone();
                            let saved_item = out.in_list_item;
                            out.indent.push_str(&" ".repeat(marker.len()));
                            out.in_list_item = true;
                            for child in &item.children {
                                out.write_node(child)?;
                            }
                            out.in_list_item = saved_item;
                            out.indent = saved_indent;
                        }
                        Ok(())
                    })?;
                }
            }

            Node::Table(table) => {
                if table.header.cells.is_empty() && table.rows.is_empty() {
                    return Err(FormatError::InvariantViolation(
                        "table has no header cells and no rows".to_string(),
                    ));
                }
                if self.in_table {
                    // A pipe table cannot nest; degrade to HTML elements.
                    self.write_table_html(table)?;
                } else {
                    self.with_paragraph_break(|out| out.write_table_markdown(table))?;
                }
            }

            Node::Collapsible(section) => {
                if self.single_line {
                    self.write_collapsible_inline(section)?;
                } else if self.in_list_item {
                    // Blank-line-delimited raw HTML does not reliably stay
                    // attached to its list item; keep the whole element on
                    // one line there.
                    self.with_paragraph_break(|out| out.write_collapsible_inline(section))?;
                } else {
                    self.with_paragraph_break(|out| out.write_collapsible_block(section))?;
                }
            }

            Node::HtmlElement(element) => {
                let attrs: String = element
                    .attributes
                    .iter()
                    .map(|(name, value)| {
                        format!(
                            " {name}=\"{}\"",
                            html_escape::encode_double_quoted_attribute(value)
                        )
                    })
                    .collect();
                if element.children.is_empty() && is_void_tag(&element.tag) {
                    self.write(&format!("<{}{attrs}>", element.tag));
                } else if is_block_tag(&element.tag) && !self.single_line {
                    self.with_paragraph_break(|out| {
                        out.write(&format!("<{}{attrs}>", element.tag));
                        Ok(())
                    })?;
                    for child in &element.children {
                        self.write_node(child)?;
                    }
                    self.with_paragraph_break(|out| {
                        out.write(&format!("</{}>", element.tag));
                        Ok(())
                    })?;
                } else {
                    self.write(&format!("<{}{attrs}>", element.tag));
                    let saved = self.in_html_block;
                    self.in_html_block = true;
                    for child in &element.children {
                        self.write_node(child)?;
                    }
                    self.in_html_block = saved;
                    self.write(&format!("</{}>", element.tag));
                }
            }

            Node::Embedded(embedded) => {
                return Err(FormatError::InvariantViolation(format!(
                    "embedded node reached the serializer unresolved: {}",
                    embedded.marker
                )));
            }

            Node::Page(_) => {
                return Err(FormatError::InvariantViolation(
                    "page node nested inside page content".to_string(),
                ));
            }
        }

        Ok(())
    }

    fn write_inline_wrapper(
        &mut self,
        delimiter: &str,
        html_open: &str,
        html_close: &str,
        children: &[Node],
    ) -> Result<(), FormatError> {
        let (open, close) = if self.in_html_block {
            (html_open, html_close)
        } else {
            (delimiter, delimiter)
        };
        self.write(open);
        for child in children {
            self.write_node(child)?;
        }
        self.write(close);
        Ok(())
    }

    fn write_link(&mut self, destination: &str, children: &[Node]) -> Result<(), FormatError> {
        if self.in_html_block && !self.in_table {
            // Markdown link syntax is unreliable inside raw HTML.
            self.write(&format!(
                "<a href=\"{}\">",
                html_escape::encode_double_quoted_attribute(destination)
            ));
            for child in children {
                self.write_node(child)?;
            }
            self.write("</a>");
        } else {
            self.write("[");
            let saved = self.single_line;
            self.single_line = true;
            for child in children {
                self.write_node(child)?;
            }
            self.single_line = saved;
            self.write("](");
            self.write(destination);
            self.write(")");
        }
        Ok(())
    }

    fn write_list_html(&mut self, list: &List) -> Result<(), FormatError> {
        let open_tag = if list.ordered {
            if list.start != 1 {
                format!("<ol start=\"{}\">", list.start)
            } else {
                "<ol>".to_string()
            }
        } else {
            "<ul>".to_string()
        };
        self.write(&open_tag);
        for item in &list.items {
            self.write("<li>");
            self.fresh_slot = true;
            let saved = self.in_html_block;
            self.in_html_block = true;
            for child in &item.children {
                self.write_node(child)?;
            }
            self.in_html_block = saved;
            self.write("</li>");
        }
        self.write(if list.ordered { "</ol>" } else { "</ul>" });
        Ok(())
    }

    fn write_table_markdown(&mut self, table: &Table) -> Result<(), FormatError> {
        let columns = table.header.cells.len().max(1);
        self.write("|");
        if table.header.cells.is_empty() {
            self.write("  |");
        }
        for cell in &table.header.cells {
            self.write_table_cell(&cell.children)?;
        }
        self.write("\n|");
        for _ in 0..columns {
            self.write(" --- |");
        }
        self.write("\n");
        for row in &table.rows {
            self.write("|");
            if row.cells.is_empty() {
                self.write("  |");
            }
            for cell in &row.cells {
                self.write_table_cell(&cell.children)?;
            }
            self.write("\n");
        }
        Ok(())
    }

    fn write_table_cell(&mut self, children: &[Node]) -> Result<(), FormatError> {
        self.write(" ");
        self.fresh_slot = true;
        let saved_single = self.single_line;
        let saved_table = self.in_table;
        self.single_line = true;
        self.in_table = true;
        for child in children {
            self.write_node(child)?;
        }
        self.single_line = saved_single;
        self.in_table = saved_table;
        self.write(" |");
        Ok(())
    }

    fn write_table_html(&mut self, table: &Table) -> Result<(), FormatError> {
        self.write("<table><tr>");
        for cell in &table.header.cells {
            self.write_table_cell_html("th", &cell.children)?;
        }
        self.write("</tr>");
        for row in &table.rows {
            self.write("<tr>");
            for cell in &row.cells {
                self.write_table_cell_html("td", &cell.children)?;
            }
            self.write("</tr>");
        }
        self.write("</table>");
        Ok(())
    }

    fn write_table_cell_html(&mut self, tag: &str, children: &[Node]) -> Result<(), FormatError> {
        self.write(&format!("<{tag}>"));
        self.fresh_slot = true;
        let saved_single = self.single_line;
        let saved_html = self.in_html_block;
        self.single_line = true;
        self.in_html_block = true;
        for child in children {
            self.write_node(child)?;
        }
        self.single_line = saved_single;
        self.in_html_block = saved_html;
        self.write(&format!("</{tag}>"));
        Ok(())
    }

    fn write_collapsible_inline(&mut self, section: &Collapsible) -> Result<(), FormatError> {
        self.write("<details>");
        if let Some(summary) = &section.summary {
            self.write("<summary>");
            self.fresh_slot = true;
            self.in_summary_scope(|out| out.write_node(summary))?;
            self.write("</summary>");
        }
        self.fresh_slot = true;
        self.in_summary_scope(|out| {
            for child in &section.children {
                out.write_node(child)?;
            }
            Ok(())
        })?;
        self.write("</details>");
        Ok(())
    }

    fn write_collapsible_block(&mut self, section: &Collapsible) -> Result<(), FormatError> {
        self.write("<details>");
        self.ensure_new_line();
        if let Some(summary) = &section.summary {
            self.write("<summary>");
            self.fresh_slot = true;
            self.in_summary_scope(|out| out.write_node(summary))?;
            self.write("</summary>");
            self.ensure_new_line();
        }
        // Markdown resumes inside <details> only after a blank line.
        self.ensure_blank_line();
        self.fresh_slot = true;
        for child in &section.children {
            self.write_node(child)?;
        }
        self.ensure_new_line();
        self.write("</details>");
        Ok(())
    }

    /// Single-line raw-HTML scope used for summaries and inline bodies.
    fn in_summary_scope<F>(&mut self, f: F) -> Result<(), FormatError>
    where
        F: FnOnce(&mut Self) -> Result<(), FormatError>,
    {
        let saved_single = self.single_line;
        let saved_html = self.in_html_block;
        self.single_line = true;
        self.in_html_block = true;
        let result = f(self);
        self.single_line = saved_single;
        self.in_html_block = saved_html;
        result
    }

    fn write_code_block_html(&mut self, block: &CodeBlock) -> Result<(), FormatError> {
        let page_id = self.page_id;
        self.write("<pre>");
        let mut cursor = 0usize;
        for link in &block.links {
            if link.start < cursor || link.end < link.start {
                return Err(FormatError::InvariantViolation(
                    "code links must be ascending and non-overlapping".to_string(),
                ));
            }
            let before = block
                .code
                .get(cursor..link.start)
                .ok_or_else(|| bad_code_link_range(link.start))?;
            self.write_preformatted(before);
            let label = block
                .code
                .get(link.start..link.end)
                .ok_or_else(|| bad_code_link_range(link.end))?;
            let destination = resolve_page_path(page_id, &link.page_id, link.anchor.as_deref());
            self.write(&format!(
                "<a href=\"{}\">",
                html_escape::encode_double_quoted_attribute(&destination)
            ));
            self.write_preformatted(label);
            self.write("</a>");
            cursor = link.end;
        }
        let rest = block
            .code
            .get(cursor..)
            .ok_or_else(|| bad_code_link_range(cursor))?;
        self.write_preformatted(rest.trim_end_matches('\n'));
        self.write("</pre>");
        Ok(())
    }

    fn write_toc(&mut self, entries: &[TocEntry]) -> Result<(), FormatError> {
        self.with_paragraph_break(|out| {
            for (index, entry) in entries.iter().enumerate() {
                out.ensure_new_line();
                let marker = format!("{}. ", index + 1);
                out.write(&marker);
                out.write_toc_entry_line(entry);
                if !entry.nested_references.is_empty() {
                    let saved_indent = out.indent.clone();
                    out.indent.push_str(&" ".repeat(marker.len()));
                    for (nested_index, nested) in entry.nested_references.iter().enumerate() {
                        out.ensure_new_line();
                        out.write(&format!("{}. ", nested_index + 1));
                        out.write_toc_entry_line(nested);
                    }
                    out.indent = saved_indent;
                }
            }
            Ok(())
        })
    }

    /// Primary link plus any same-level inline references, comma-joined.
    fn write_toc_entry_line(&mut self, entry: &TocEntry) {
        self.write_toc_link(entry);
        for inline in &entry.inline_references {
            self.write(", ");
            self.write_toc_link(inline);
        }
    }

    fn write_toc_link(&mut self, entry: &TocEntry) {
        self.write("[");
        self.write(&escape_markdown(&entry.text));
        self.write("](#");
        self.write(&entry.url_hash_text);
        self.write(")");
    }
}

fn bad_code_link_range(offset: usize) -> FormatError {
    FormatError::InvariantViolation(format!(
        "code link offset {offset} is out of range or splits a character"
    ))
}

fn is_block_tag(tag: &str) -> bool {
    matches!(
        tag,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "details"
            | "div"
            | "dl"
            | "fieldset"
            | "figure"
            | "footer"
            | "form"
            | "header"
            | "main"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "ul"
    )
}
