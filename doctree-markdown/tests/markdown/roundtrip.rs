//! Round-trip stability: rendered output parses back to the same tree.

use doctree_markdown::{parse, render_page, ParseOptions};
use doctree_model::{Node, Page, TocEntry};
use pretty_assertions::assert_eq;

fn render_children(children: Vec<Node>) -> String {
    render_page(&Page::new("docs/page", "Page", children)).expect("render failed")
}

#[test]
fn authored_markdown_survives_parse_render_parse() {
    let source = "\
# Title

Some *text* with `code`.

- one
- two

```rust
fn main() {}
```
";
    let options = ParseOptions::default();
    let first = parse(source, &options).expect("first parse failed");

    let children = match first.root.clone() {
        Node::Container(c) => c.children,
        other => panic!("root is not a container: {}", other.kind()),
    };
    let rendered = render_children(children);
    assert_eq!(rendered, source);

    let second = parse(&rendered, &options).expect("second parse failed");
    assert_eq!(first.root, second.root);
}

#[test]
fn table_dialect_round_trips() {
    let source = "\
| A | B |
| --- | --- |
| 1 | 2 |
";
    let options = ParseOptions::default();
    let first = parse(source, &options).expect("first parse failed");
    let children = match first.root.clone() {
        Node::Container(c) => c.children,
        other => panic!("root is not a container: {}", other.kind()),
    };
    let rendered = render_children(children);
    assert_eq!(rendered, source);
}

#[test]
fn heading_anchor_survives_render_and_reparse() {
    let source = "## Options {#options}\n";
    let options = ParseOptions::default();
    let first = parse(source, &options).expect("first parse failed");
    let children = match first.root.clone() {
        Node::Container(c) => c.children,
        other => panic!("root is not a container: {}", other.kind()),
    };
    let rendered = render_children(children);
    assert_eq!(rendered, source);
    let second = parse(&rendered, &options).expect("second parse failed");
    assert_eq!(first.root, second.root);
}

#[test]
fn toc_snapshot() {
    let mut page = Page::new("docs/page", "Page", vec![]);
    page.toc = Some(vec![
        TocEntry::new("A till 1", "a"),
        TocEntry::new("B", "b").with_nested(vec![TocEntry::new("B.1", "b1")]),
    ]);
    let output = render_page(&page).expect("render failed");
    insta::assert_snapshot!(output, @r"
    1. [A till 1](#a)
    2. [B](#b)
       1. [B.1](#b1)
    ");
}
