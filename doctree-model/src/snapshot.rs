//! JSON page snapshots and content hashing.
//!
//! The node model is plain data, so a page tree round-trips through JSON
//! unchanged; the client-side renderer consumes exactly this snapshot. The
//! content hash over the snapshot text is what the publishing layer uses
//! for cache busting.

use crate::nodes::Page;

/// Serializes a page tree to its canonical JSON snapshot.
pub fn page_snapshot(page: &Page) -> Result<String, serde_json::Error> {
    serde_json::to_string(page)
}

/// Hex SHA-1 of a snapshot string.
pub fn content_hash(snapshot: &str) -> String {
    let mut hasher = sha1_smol::Sha1::new();
    hasher.update(snapshot.as_bytes());
    hasher.digest().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{Node, Page};

    #[test]
    fn snapshot_round_trips() {
        let page = Page::new(
            "docs/widget",
            "Widget",
            vec![Node::paragraph(vec![Node::text("hi")])],
        );
        let json = page_snapshot(&page).unwrap();
        let back: Page = serde_json::from_str(&json).unwrap();
        assert_eq!(page, back);
    }

    #[test]
    fn hash_is_stable_and_content_sensitive() {
        let a = content_hash("{\"id\":\"a\"}");
        let b = content_hash("{\"id\":\"a\"}");
        let c = content_hash("{\"id\":\"b\"}");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 40);
    }
}
