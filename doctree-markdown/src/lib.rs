//! Markdown import/export for doctree content trees
//!
//!     This crate is the format half of the doctree pipeline. It turns
//!     authored Markdown (with optional YAML front matter) into the node
//!     model defined by `doctree-model`, and turns finished page trees
//!     back into the Markdown/HTML-hybrid text the static-site layer
//!     publishes. The analysis layer that produces doc-comment trees and
//!     the build orchestration around all of this are external; nothing
//!     here touches the filesystem or the network.
//!
//! Architecture
//!
//!     Three pieces, each grounded on the model crate:
//!
//!     - markdown/parser.rs: comrak AST -> node model lowering, with an
//!       incremental html5ever channel for raw HTML and a comment hook.
//!     - embed.rs: the embedded-node substitution engine, which lets
//!       typed rich nodes survive a flatten-and-reparse round trip via
//!       session-scoped HTML-comment markers.
//!     - markdown/serializer.rs: the context-tracking pretty-printer that
//!       decides, per node and context, between native Markdown syntax
//!       and an equivalent HTML element.
//!
//!     The file structure:
//!     .
//!     ├── error.rs                # FormatError
//!     ├── common
//!     │   ├── escape.rs           # Markdown escaping, delimiter widths
//!     │   └── links.rs            # page-relative link path algebra
//!     ├── markdown
//!     │   ├── parser.rs           # Markdown -> tree import
//!     │   ├── raw_html.rs         # chunk-fed HTML tokenizer
//!     │   └── serializer.rs       # tree -> Markdown export
//!     ├── embed.rs                # embedded-node substitution engine
//!     └── lib.rs
//!
//! Concurrency
//!
//!     Everything is synchronous and CPU-bound. Callers may run one
//!     pipeline per page in parallel; each render owns its tree and its
//!     own `EmbedSession`, so no state is shared across pipelines.

pub mod common;
pub mod embed;
pub mod error;
pub mod markdown;

pub use embed::EmbedSession;
pub use error::FormatError;
pub use markdown::{parse, parse_with_comment_hook, render_page, ParseOptions, ParsedDocument};
