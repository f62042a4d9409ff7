//! Table-of-contents structures.
//!
//! A page's table of contents is not part of the node tree: it is a small
//! page-scoped index the serializer renders on the fly as a nested ordered
//! list. Entries nest exactly one level, and an entry can carry same-level
//! "inline" cross references for exported names that have more than one
//! documented form (say, a function and a type sharing a name).

use serde::{Deserialize, Serialize};

/// One table-of-contents entry: display text plus a URL hash fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TocEntry {
    pub text: String,
    pub url_hash_text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested_references: Vec<TocEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inline_references: Vec<TocEntry>,
}

impl TocEntry {
    pub fn new(text: impl Into<String>, url_hash_text: impl Into<String>) -> TocEntry {
        TocEntry {
            text: text.into(),
            url_hash_text: url_hash_text.into(),
            nested_references: Vec::new(),
            inline_references: Vec::new(),
        }
    }

    pub fn with_nested(mut self, nested: Vec<TocEntry>) -> TocEntry {
        self.nested_references = nested;
        self
    }

    pub fn with_inline(mut self, inline: Vec<TocEntry>) -> TocEntry {
        self.inline_references = inline;
        self
    }
}
