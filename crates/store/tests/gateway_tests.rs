//! Integration tests for the JSON and HTML forms

use doc_model::nodes::{
    create_bibliography, create_citation, create_image, create_list, create_list_item,
    create_review_mark, create_table, create_table_cell, create_table_row, heading,
    horizontal_rule, paragraph, quote, HeadingTag, ImageProps, ListType, ReviewComment,
};
use doc_model::{DocumentTree, Node, NodeBody, NodeId, NodeRegistry, NodeType, TextBody, TextFormat, TextMode};
use proptest::prelude::*;
use serde_json::json;
use store::{export_html, export_json, import_html, import_json, WarningKind};

#[test]
fn test_chapter_roundtrip_then_html() {
    let registry = NodeRegistry::with_defaults();
    let mut tree = DocumentTree::new();
    let root = tree.root_id();
    let h = tree.append(heading(HeadingTag::H1), root).unwrap();
    tree.append(Node::text("Chapter 1"), h).unwrap();
    let p = tree.append(paragraph(), root).unwrap();
    tree.append(Node::text("Hello "), p).unwrap();
    tree.append(create_citation("(Smith, 2020)"), p).unwrap();
    tree.append(Node::text("."), p).unwrap();

    let json = export_json(&tree, &registry).unwrap();
    let reloaded = import_json(&json, &registry).unwrap();
    assert!(!reloaded.has_warnings());
    assert!(reloaded.tree.same_structure(&tree));

    assert_eq!(
        export_html(&reloaded.tree, &registry).unwrap(),
        r#"<h1>Chapter 1</h1><p>Hello <span class="citation">(Smith, 2020)</span>.</p>"#
    );
}

#[test]
fn test_unknown_widget_inside_paragraph_loads() {
    let registry = NodeRegistry::with_defaults();
    let doc = json!({
        "type": "root",
        "version": 1,
        "children": [{
            "type": "paragraph",
            "version": 1,
            "children": [{"type": "unknown_widget", "version": 1}]
        }]
    });
    let result = import_json(&doc, &registry).unwrap();
    assert_eq!(result.warnings_of_kind(WarningKind::UnknownNodeType).len(), 1);

    let tree = &result.tree;
    tree.validate().unwrap();
    let para = tree.children(tree.root_id())[0];
    let children = tree.children(para);
    assert_eq!(children.len(), 1);
    assert_eq!(tree.node_type(children[0]), Some(&NodeType::TEXT));
}

#[test]
fn test_older_image_reads_default_width() {
    let registry = NodeRegistry::with_defaults();
    let doc = json!({
        "type": "root",
        "children": [{
            "type": "paragraph",
            "children": [{"type": "image", "version": 1, "src": "a.png", "altText": "A"}]
        }]
    });
    let result = import_json(&doc, &registry).unwrap();
    assert!(!result.has_warnings());
    let image = result
        .tree
        .iter()
        .find(|n| n.node_type() == &NodeType::IMAGE)
        .and_then(ImageProps::from_node)
        .unwrap();
    assert_eq!(image, ImageProps::new("a.png", "A"));
}

#[test]
fn test_html_drops_citation_atomicity() {
    let registry = NodeRegistry::with_defaults();
    let html = r#"<p>Hello <span class="citation">(Smith, 2020)</span>.</p>"#;
    let result = import_html(html, &registry).unwrap();
    assert_eq!(result.tree.text_content(), "Hello (Smith, 2020).");
    assert!(!result.tree.iter().any(|n| n.node_type() == &NodeType::CITATION));
    assert!(!result.tree.iter().any(Node::is_atomic));
}

#[test]
fn test_html_roundtrip_of_domain_blocks() {
    let registry = NodeRegistry::with_defaults();
    let html = concat!(
        r#"<p class="bibliography-entry">Doe, J. (1999).</p>"#,
        r#"<p><mark class="review-comment" data-comment-id="c1" data-comment="source?">claim</mark>"#,
        r#"<img src="fig.png" alt="Figure 1" style="max-width: 320px;"></p>"#,
        "<ul><li>one</li><li><strong>two</strong></li></ul><hr>"
    );
    let first = import_html(html, &registry).unwrap();
    assert!(!first.has_warnings());
    let again = export_html(&first.tree, &registry).unwrap();
    assert_eq!(again, html);
}

// =========================================================================
// Property: JSON round trip over generated documents
// =========================================================================

#[derive(Debug, Clone)]
enum InlineSpec {
    Text(String, u32, bool),
    Citation(String),
    Image(String, String, u32),
    Comment(String, Vec<(String, u32)>),
}

#[derive(Debug, Clone)]
enum BlockSpec {
    Paragraph(Vec<InlineSpec>),
    Heading(usize, Vec<InlineSpec>),
    Quote(Vec<InlineSpec>),
    Bibliography(Vec<InlineSpec>),
    List(bool, Vec<Vec<InlineSpec>>),
    Rule,
    Table(usize, usize, bool),
}

fn text_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,6}( [a-z]{1,6}){0,2}"
}

fn inline_strategy() -> impl Strategy<Value = InlineSpec> {
    prop_oneof![
        4 => (text_strategy(), 0u32..128, any::<bool>()).prop_map(|(t, f, a)| InlineSpec::Text(t, f, a)),
        1 => ("[A-Z][a-z]{2,6}", 1900u32..2030).prop_map(|(a, y)| InlineSpec::Citation(format!("({a}, {y})"))),
        1 => ("[a-z]{1,8}\\.png", text_strategy(), 1u32..2000)
            .prop_map(|(s, alt, w)| InlineSpec::Image(s, alt, w)),
        1 => (text_strategy(), prop::collection::vec((text_strategy(), 0u32..128), 1..3))
            .prop_map(|(c, texts)| InlineSpec::Comment(c, texts)),
    ]
}

fn inlines() -> impl Strategy<Value = Vec<InlineSpec>> {
    prop::collection::vec(inline_strategy(), 0..5)
}

fn block_strategy() -> impl Strategy<Value = BlockSpec> {
    prop_oneof![
        4 => inlines().prop_map(BlockSpec::Paragraph),
        1 => (0usize..6, inlines()).prop_map(|(l, i)| BlockSpec::Heading(l, i)),
        1 => inlines().prop_map(BlockSpec::Quote),
        1 => inlines().prop_map(BlockSpec::Bibliography),
        1 => (any::<bool>(), prop::collection::vec(inlines(), 1..4)).prop_map(|(n, i)| BlockSpec::List(n, i)),
        1 => Just(BlockSpec::Rule),
        1 => (1usize..4, 1usize..4, any::<bool>()).prop_map(|(r, c, h)| BlockSpec::Table(r, c, h)),
    ]
}

fn text_node(text: &str, bits: u32, atomic: bool) -> Node {
    let mode = if atomic { TextMode::Atomic } else { TextMode::Normal };
    let body = TextBody::new(text)
        .with_format(TextFormat::from_bits_truncate(bits))
        .with_mode(mode);
    Node::new(NodeType::TEXT, NodeBody::Text(body))
}

fn build_inlines(tree: &mut DocumentTree, parent: NodeId, specs: &[InlineSpec]) {
    for spec in specs {
        match spec {
            InlineSpec::Text(t, f, a) => {
                tree.append(text_node(t, *f, *a), parent).unwrap();
            }
            InlineSpec::Citation(t) => {
                tree.append(create_citation(t.as_str()), parent).unwrap();
            }
            InlineSpec::Image(src, alt, w) => {
                let props = ImageProps::new(src.as_str(), alt.as_str()).with_max_width(*w);
                tree.append(create_image(&props), parent).unwrap();
            }
            InlineSpec::Comment(comment, texts) => {
                let mark = tree
                    .append(create_review_mark(&ReviewComment::new("c-1", comment.as_str())), parent)
                    .unwrap();
                for (t, f) in texts {
                    tree.append(text_node(t, *f, false), mark).unwrap();
                }
            }
        }
    }
}

fn build(blocks: &[BlockSpec]) -> DocumentTree {
    const TAGS: [HeadingTag; 6] = [
        HeadingTag::H1,
        HeadingTag::H2,
        HeadingTag::H3,
        HeadingTag::H4,
        HeadingTag::H5,
        HeadingTag::H6,
    ];
    let mut tree = DocumentTree::new();
    let root = tree.root_id();
    for block in blocks {
        match block {
            BlockSpec::Paragraph(i) => {
                let id = tree.append(paragraph(), root).unwrap();
                build_inlines(&mut tree, id, i);
            }
            BlockSpec::Heading(level, i) => {
                let id = tree.append(heading(TAGS[*level]), root).unwrap();
                build_inlines(&mut tree, id, i);
            }
            BlockSpec::Quote(i) => {
                let id = tree.append(quote(), root).unwrap();
                build_inlines(&mut tree, id, i);
            }
            BlockSpec::Bibliography(i) => {
                let id = tree.append(create_bibliography(), root).unwrap();
                build_inlines(&mut tree, id, i);
            }
            BlockSpec::List(numbered, items) => {
                let kind = if *numbered { ListType::Number } else { ListType::Bullet };
                let list = tree.append(create_list(kind), root).unwrap();
                for item in items {
                    let id = tree.append(create_list_item(), list).unwrap();
                    build_inlines(&mut tree, id, item);
                }
            }
            BlockSpec::Rule => {
                tree.append(horizontal_rule(), root).unwrap();
            }
            BlockSpec::Table(rows, cols, headers) => {
                let table = tree.append(create_table(), root).unwrap();
                for r in 0..*rows {
                    let row = tree.append(create_table_row(), table).unwrap();
                    for _ in 0..*cols {
                        let cell = tree.append(create_table_cell(*headers && r == 0), row).unwrap();
                        let p = tree.append(paragraph(), cell).unwrap();
                        tree.append(Node::text("cell"), p).unwrap();
                    }
                }
            }
        }
    }
    tree
}

fn generic_block_strategy() -> impl Strategy<Value = (usize, Vec<(String, u32)>)> {
    (0usize..3, prop::collection::vec((text_strategy(), 0u32..128), 1..4))
}

proptest! {
    #[test]
    fn prop_json_roundtrip_is_lossless(blocks in prop::collection::vec(block_strategy(), 0..8)) {
        let registry = NodeRegistry::with_defaults();
        let tree = build(&blocks);
        let json = export_json(&tree, &registry).unwrap();
        let result = import_json(&json, &registry).unwrap();
        prop_assert!(!result.has_warnings(), "{:?}", result.warnings);
        prop_assert!(result.tree.same_structure(&tree));
        prop_assert_eq!(export_json(&result.tree, &registry).unwrap(), json);
    }

    #[test]
    fn prop_html_roundtrip_keeps_generic_text(blocks in prop::collection::vec(generic_block_strategy(), 1..6)) {
        let registry = NodeRegistry::with_defaults();
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        for (kind, texts) in &blocks {
            let node = match kind {
                0 => paragraph(),
                1 => heading(HeadingTag::H2),
                _ => quote(),
            };
            let id = tree.append(node, root).unwrap();
            for (t, f) in texts {
                tree.append(text_node(t, *f, false), id).unwrap();
            }
        }

        let html = export_html(&tree, &registry).unwrap();
        let back = import_html(&html, &registry).unwrap();
        prop_assert!(!back.has_warnings());
        prop_assert_eq!(back.tree.text_content(), tree.text_content());
        let kinds = |t: &DocumentTree| -> Vec<NodeType> {
            t.children(t.root_id()).iter().filter_map(|&id| t.node_type(id).cloned()).collect()
        };
        prop_assert_eq!(kinds(&back.tree), kinds(&tree));
    }
}
