//! Full-page rendering tests.

use doctree_markdown::render_page;
use doctree_model::{content_hash, page_snapshot, Node, Page, TableCell, TableRow, TocEntry};
use pretty_assertions::assert_eq;

fn widget_page() -> Page {
    let mut page = Page::new(
        "docs/api/widget",
        "Widget",
        vec![
            Node::DoNotEdit,
            Node::page_title("Widget"),
            Node::heading(2, vec![Node::text("Remarks")]),
            Node::paragraph(vec![
                Node::text("Widgets are "),
                Node::bold(vec![Node::text("reusable")]),
                Node::text(". See "),
                Node::local_link("docs/api/button", None, vec![Node::text("Button")]),
                Node::text("."),
            ]),
            Node::table(
                TableRow::new(vec![
                    TableCell::new(vec![Node::text("Property")]),
                    TableCell::new(vec![Node::text("Description")]),
                ]),
                vec![TableRow::new(vec![
                    TableCell::new(vec![Node::code_span("size")]),
                    TableCell::new(vec![Node::text("Current size")]),
                ])],
            ),
            Node::code_block("ts", "const w = new Widget();\n"),
        ],
    );
    page.toc = Some(vec![TocEntry::new("Remarks", "remarks")]);
    page
}

#[test]
fn renders_a_complete_page() {
    let output = render_page(&widget_page()).expect("render failed");
    let expected = "\
<!-- Do not edit this file. It is generated automatically. -->

# Widget

1. [Remarks](#remarks)

## Remarks

Widgets are **reusable**. See [Button](../button).

| Property | Description |
| --- | --- |
| `size` | Current size |

```ts
const w = new Widget();
```
";
    assert_eq!(output, expected);
}

#[test]
fn same_tree_renders_differently_per_page_location() {
    let tree = vec![Node::paragraph(vec![Node::local_link(
        "docs/api/button",
        None,
        vec![Node::text("Button")],
    )])];

    let near = render_page(&Page::new("docs/api/widget", "W", tree.clone())).unwrap();
    let far = render_page(&Page::new("docs/guide/intro/setup", "S", tree)).unwrap();

    assert_eq!(near, "[Button](../button)\n");
    assert_eq!(far, "[Button](../../../api/button)\n");
}

#[test]
fn snapshot_and_hash_are_deterministic() {
    let page = widget_page();
    let first = page_snapshot(&page).expect("snapshot failed");
    let second = page_snapshot(&page).expect("snapshot failed");
    assert_eq!(first, second);
    assert_eq!(content_hash(&first), content_hash(&second));

    let mut altered = widget_page();
    altered.children.push(Node::paragraph(vec![Node::text("x")]));
    let altered_snapshot = page_snapshot(&altered).expect("snapshot failed");
    assert_ne!(content_hash(&first), content_hash(&altered_snapshot));
}
