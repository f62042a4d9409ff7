//! Content-tree model for generated documentation pages.
//!
//! This crate is the data half of the doctree pipeline: the closed [`Node`]
//! union and its special-shaped containers, the generic tree walker, the
//! invariant-restoring simplifier, the table-of-contents structures, and
//! the JSON snapshot/content-hash output. It knows nothing about Markdown;
//! parsing and serialization live in `doctree-markdown`.
//!
//! The file structure:
//!
//!     ├── nodes.rs      # Node union, builders, serde shape
//!     ├── walk.rs       # pre-order traversal with slot replacement
//!     ├── simplify.rs   # invariant-restoring rewrite pass
//!     ├── toc.rs        # table-of-contents entries
//!     └── snapshot.rs   # JSON snapshot + content hash
//!
//! Everything here is synchronous, single-threaded and allocation-only;
//! trees are owned by the caller and nothing retains references after a
//! pass returns.

pub mod nodes;
pub mod simplify;
pub mod snapshot;
pub mod toc;
pub mod walk;

pub use nodes::{
    CodeBlock, CodeLink, CodeSpan, Collapsible, Container, Embedded, ExternalLink, Heading,
    HtmlElement, Image, List, ListItem, LocalLink, NamedAnchor, Node, Page, PageTitle, Paragraph,
    SourceLink, Styled, Table, TableCell, TableRow, Text,
};
pub use simplify::simplify;
pub use snapshot::{content_hash, page_snapshot};
pub use toc::TocEntry;
pub use walk::{for_each_child_list, walk, walk_children, ChildList, Visit};
