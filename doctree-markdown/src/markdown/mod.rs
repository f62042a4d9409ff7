//! Markdown dialect implementation
//!
//! Bidirectional conversion between the doctree node model and the
//! constrained Markdown dialect the documentation pipeline emits. This is
//! not a general-purpose Markdown processor: it only has to round-trip
//! the dialect the pipeline itself generates, plus what documentation
//! authors are allowed to write in source files.
//!
//! # Library Choice
//!
//! Parsing uses the `comrak` crate (CommonMark with the table,
//! strikethrough, superscript and front-matter extensions). Serialization
//! is hand-written: the output dialect interleaves Markdown with raw HTML
//! fallbacks under context rules no off-the-shelf formatter expresses.
//! Raw HTML inside the Markdown is tokenized by `html5ever`.
//!
//! # Element Mapping Table
//!
//! | Node             | Markdown form         | Fallback (context)                      |
//! |------------------|-----------------------|-----------------------------------------|
//! | Text             | escaped text          | entity-escaped (in raw HTML)            |
//! | Bold/Italic/Strike | `**` `*` `~~`       | `<b>/<i>/<s>` (in raw HTML)             |
//! | Sub/Superscript  | —                     | always `<sub>/<sup>`                    |
//! | CodeSpan         | `` `code` ``          | `<code>` (raw HTML, pipes in a cell)    |
//! | Links            | `[text](relative)`    | `<a href>` (raw HTML outside tables)    |
//! | Heading          | `#`..`######`         | bold text (single-line contexts)        |
//! | List             | `-` / `N.` markers    | `<ul>/<ol start>` (single-line)         |
//! | CodeBlock        | backtick fence        | `<pre>` (code links or single-line)     |
//! | Table            | pipe table            | `<table>` elements (nested tables)      |
//! | Collapsible      | `<details>` block     | one-line `<details>` (single-line/item) |
//! | LineBreak        | `<br>`                |                                         |
//! | NamedAnchor      | `<a name=...></a>`    |                                         |
//! | HorizontalRule   | `---`                 |                                         |
//!
//! # Unsupported on import
//!
//! Footnotes, block quotes, hard line breaks (trailing double-space) and
//! doctype declarations are hard parse errors; a second front-matter
//! block likewise. Links and images with an empty destination are logged
//! and dropped rather than failing the page.

pub mod parser;
mod raw_html;
pub mod serializer;

pub use parser::{parse, parse_with_comment_hook, ParseOptions, ParsedDocument};
pub use serializer::render_page;
