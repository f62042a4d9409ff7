//! End-to-end Markdown import tests over realistic documentation source.

use doctree_markdown::{parse, FormatError, ParseOptions};
use doctree_model::Node;

fn children(root: &Node) -> &[Node] {
    match root {
        Node::Container(c) => &c.children,
        other => panic!("root is not a container: {}", other.kind()),
    }
}

#[test]
fn full_document_lowers_every_supported_block() {
    let source = "\
---
title: Widget API
---

# Widget {#widget}

The `Widget` type is **stable**.

## Options

| Name | Default |
| ---- | ------- |
| size | `1`     |

- build it
- ship it

```ts
new Widget();
```

---
";
    let doc = parse(source, &ParseOptions::default()).expect("parse failed");

    assert_eq!(
        doc.frontmatter,
        Some(vec![("title".to_string(), "Widget API".to_string())])
    );

    let blocks = children(&doc.root);
    assert_eq!(blocks.len(), 7);

    match &blocks[0] {
        Node::Heading(h) => {
            assert_eq!(h.level, 1);
            assert_eq!(h.anchor.as_deref(), Some("widget"));
            assert_eq!(h.children, vec![Node::text("Widget")]);
        }
        other => panic!("expected heading, got {}", other.kind()),
    }

    match &blocks[1] {
        Node::Paragraph(p) => {
            assert_eq!(
                p.children,
                vec![
                    Node::text("The "),
                    Node::code_span("Widget"),
                    Node::text(" type is "),
                    Node::bold(vec![Node::text("stable")]),
                    Node::text("."),
                ]
            );
        }
        other => panic!("expected paragraph, got {}", other.kind()),
    }

    assert!(matches!(&blocks[2], Node::Heading(h) if h.level == 2));

    match &blocks[3] {
        Node::Table(table) => {
            assert_eq!(table.header.cells.len(), 2);
            assert_eq!(table.rows.len(), 1);
            assert_eq!(
                table.rows[0].cells[1].children,
                vec![Node::code_span("1")]
            );
        }
        other => panic!("expected table, got {}", other.kind()),
    }

    match &blocks[4] {
        Node::List(list) => {
            assert!(!list.ordered);
            assert_eq!(list.items.len(), 2);
        }
        other => panic!("expected list, got {}", other.kind()),
    }

    match &blocks[5] {
        Node::CodeBlock(block) => {
            assert_eq!(block.language, "ts");
            assert_eq!(block.code, "new Widget();\n");
        }
        other => panic!("expected code block, got {}", other.kind()),
    }

    assert!(matches!(&blocks[6], Node::HorizontalRule));
}

#[test]
fn details_block_with_markdown_body() {
    let source = "\
<details>
<summary>History</summary>

Introduced in *v2*.

</details>
";
    let doc = parse(source, &ParseOptions::default()).expect("parse failed");
    let blocks = children(&doc.root);
    assert_eq!(blocks.len(), 1);
    match &blocks[0] {
        Node::HtmlElement(details) => {
            assert_eq!(details.tag, "details");
            match &details.children[0] {
                Node::HtmlElement(summary) => {
                    assert_eq!(summary.tag, "summary");
                    assert_eq!(summary.children, vec![Node::text("History")]);
                }
                other => panic!("expected summary, got {}", other.kind()),
            }
            match &details.children[1] {
                Node::Paragraph(p) => {
                    assert_eq!(
                        p.children,
                        vec![
                            Node::text("Introduced in "),
                            Node::italic(vec![Node::text("v2")]),
                            Node::text("."),
                        ]
                    );
                }
                other => panic!("expected paragraph, got {}", other.kind()),
            }
        }
        other => panic!("expected details element, got {}", other.kind()),
    }
}

#[test]
fn unsupported_constructs_report_their_fragment() {
    let err = parse("intro\n\n> no quotes allowed\n", &ParseOptions::default()).unwrap_err();
    match err {
        FormatError::UnsupportedSyntax {
            construct,
            fragment,
        } => {
            assert_eq!(construct, "block quote");
            assert_eq!(fragment, "> no quotes allowed");
        }
        other => panic!("expected unsupported syntax, got {other}"),
    }
}
