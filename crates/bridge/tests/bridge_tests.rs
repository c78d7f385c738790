//! End-to-end tests through the editor facade

use bridge::{Editor, EditorBridge, LoadOutcome};
use doc_model::nodes::{is_citation, list_type, ImageProps, ListType};
use doc_model::{NodeType, Position, Selection};
use edit_engine::{CommandKind, CommandPriority, EditorCommand, InsertText};
use proptest::prelude::*;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use store::WarningKind;

fn chapter_json() -> serde_json::Value {
    json!({
        "type": "root",
        "version": 1,
        "children": [
            {"type": "heading", "version": 1, "tag": "h1", "children": [
                {"type": "text", "version": 1, "text": "Chapter 1", "format": 0, "mode": "normal"}
            ]},
            {"type": "paragraph", "version": 1, "children": [
                {"type": "text", "version": 1, "text": "Hello ", "format": 0, "mode": "normal"},
                {"type": "citation", "version": 1, "text": "(Smith, 2020)", "format": 0, "mode": "atomic"},
                {"type": "text", "version": 1, "text": ".", "format": 0, "mode": "normal"}
            ]}
        ]
    })
}

fn select_all(editor: &mut Editor) {
    let root = editor.tree().root_id();
    let last = editor.tree().children(root).len();
    editor
        .set_selection(Selection::new(Position::new(root, 0), Position::new(root, last)))
        .unwrap();
}

#[test]
fn test_chapter_json_to_html() {
    let mut editor = Editor::new();
    editor.load_initial_json(&chapter_json()).unwrap();
    let saved = editor.to_json().unwrap();

    let mut reopened = Editor::new();
    reopened.load_initial_json(&saved).unwrap();
    assert_eq!(
        reopened.get_html(),
        r#"<h1>Chapter 1</h1><p>Hello <span class="citation">(Smith, 2020)</span>.</p>"#
    );
}

#[test]
fn test_image_into_empty_paragraph() {
    let mut editor = Editor::new();
    assert!(editor.dispatch("InsertImage", json!({"source": "img.png", "altText": "Figure 1"})));

    let tree = editor.tree();
    let blocks = tree.children(tree.root_id());
    assert_eq!(blocks.len(), 1);
    assert_eq!(tree.node_type(blocks[0]), Some(&NodeType::PARAGRAPH));
    let children = tree.children(blocks[0]);
    assert_eq!(children.len(), 1);
    let props = ImageProps::from_node(tree.node(children[0]).unwrap()).unwrap();
    assert_eq!(props.source, "img.png");
    assert_eq!(props.alt_text, "Figure 1");
}

#[test]
fn test_bullet_list_over_two_paragraphs() {
    let mut editor = Editor::new();
    editor.load_initial_html("<p>First</p><p>Second</p>").unwrap();
    select_all(&mut editor);
    assert!(editor.dispatch("ApplyListType", json!({"kind": "bullet"})));

    let tree = editor.tree();
    let blocks = tree.children(tree.root_id());
    assert_eq!(blocks.len(), 1);
    let list = tree.node(blocks[0]).unwrap();
    assert_eq!(list_type(list), Some(ListType::Bullet));
    let items = tree.children(blocks[0]);
    assert_eq!(items.len(), 2);
    assert!(items
        .iter()
        .all(|&id| tree.node_type(id) == Some(&NodeType::LIST_ITEM)));
    assert_eq!(tree.node_text_content(items[0]), "First");
    assert_eq!(tree.node_text_content(items[1]), "Second");
}

#[test]
fn test_stream_chunks_become_sibling_paragraphs() {
    let mut editor = Editor::new();
    editor.insert_content("<p>AI generated text</p>");
    editor.insert_content("<p>AI generated text</p>");

    let tree = editor.tree();
    let blocks = tree.children(tree.root_id());
    assert_eq!(blocks.len(), 2);
    for &block in blocks {
        assert_eq!(tree.node_type(block), Some(&NodeType::PARAGRAPH));
        assert_eq!(tree.node_text_content(block), "AI generated text");
    }
    assert_eq!(editor.get_html(), "<p>AI generated text</p><p>AI generated text</p>");
}

#[test]
fn test_inline_chunk_continues_last_paragraph() {
    let mut editor = Editor::new();
    editor.insert_content("<p>Start</p>");
    editor.insert_content("<em>more</em>");
    assert_eq!(editor.get_html(), "<p>Start<em>more</em></p>");
}

#[test]
fn test_comparison_in_streamed_text_is_kept() {
    let mut editor = Editor::new();
    editor.insert_content("<p>We find p < 0.05 in all trials.</p><p>Second paragraph.</p>");
    assert_eq!(
        editor.tree().text_content(),
        "We find p < 0.05 in all trials.\nSecond paragraph."
    );
    assert_eq!(
        editor.get_html(),
        "<p>We find p &lt; 0.05 in all trials.</p><p>Second paragraph.</p>"
    );
}

#[test]
fn test_typed_spacing_survives_html_round_trip() {
    let mut source = Editor::new();
    assert!(source.dispatch("InsertText", json!({"text": "  two  spaces "})));

    let mut copy = Editor::new();
    copy.insert_content(&source.get_html());
    assert_eq!(copy.tree().text_content(), "  two  spaces ");
    assert_eq!(copy.get_html(), source.get_html());
}

#[test]
fn test_deeply_nested_paste_does_not_abort() {
    let levels = 20_000;
    let html = format!("<p>{}x{}</p>", "<span>".repeat(levels), "</span>".repeat(levels));
    let mut editor = Editor::new();
    editor.insert_content(&html);
    assert_eq!(editor.tree().text_content(), "x");
}

#[test]
fn test_unknown_widget_loads_with_placeholder() {
    let mut editor = Editor::new();
    let doc = json!({
        "type": "root",
        "version": 1,
        "children": [{
            "type": "paragraph",
            "version": 1,
            "children": [{"type": "unknown_widget", "version": 1}]
        }]
    });
    let outcome = editor.load_initial_json(&doc).unwrap();
    let LoadOutcome::Loaded { warnings } = outcome else {
        panic!("load was skipped");
    };
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, WarningKind::UnknownNodeType);

    let tree = editor.tree();
    let para = tree.children(tree.root_id())[0];
    assert_eq!(tree.children(para).len(), 1);
    assert_eq!(tree.text_content(), "[unknown_widget]");
}

#[test]
fn test_initial_load_runs_once() {
    let html = "<h2>Notes</h2><p>Body</p>";
    let mut once = Editor::new();
    once.load_initial_html(html).unwrap();

    let mut twice = Editor::new();
    twice.load_initial_html(html).unwrap();
    assert_eq!(twice.load_initial_html(html).unwrap(), LoadOutcome::Skipped);
    assert!(twice.tree().same_structure(once.tree()));
}

#[test]
fn test_load_after_edit_keeps_user_text() {
    let mut editor = Editor::new();
    assert!(editor.dispatch("InsertText", json!({"text": "typed first"})));
    assert_eq!(
        editor.load_initial_html("<p>stale copy</p>").unwrap(),
        LoadOutcome::Skipped
    );
    assert_eq!(editor.tree().text_content(), "typed first");
}

#[test]
fn test_higher_priority_handler_wins() {
    let mut editor = Editor::new();
    editor.engine_mut().register_handler(
        CommandKind::InsertText,
        CommandPriority::High,
        |command, tx| {
            let EditorCommand::InsertText(InsertText { text }) = command else {
                return Ok(false);
            };
            let shouted = EditorCommand::InsertText(InsertText {
                text: text.to_uppercase(),
            });
            edit_engine::text_commands::insert_text(&shouted, tx)
        },
    );
    assert!(editor.dispatch("InsertText", json!({"text": "quiet"})));
    assert_eq!(editor.tree().text_content(), "QUIET");
}

#[test]
fn test_citation_only_leaves_as_a_whole() {
    let mut editor = Editor::new();
    assert!(editor.dispatch("InsertText", json!({"text": "See "})));
    assert!(editor.dispatch("InsertCitation", json!({"author": "Smith", "year": "2020"})));
    assert_eq!(editor.tree().text_content(), "See (Smith, 2020)");

    let tree = editor.tree();
    let citation = tree.iter().find(|n| is_citation(n)).map(|n| n.id()).unwrap();
    let range = json!({
        "range": {
            "anchor": {"nodeId": citation.to_string(), "offset": 1},
            "focus": {"nodeId": citation.to_string(), "offset": 4}
        }
    });
    assert!(!editor.dispatch("DeleteText", range));
    assert_eq!(editor.tree().text_content(), "See (Smith, 2020)");

    assert!(editor.dispatch("DeleteCharacter", json!({"backward": true})));
    assert_eq!(editor.tree().text_content(), "See ");
    assert!(!editor.tree().iter().any(is_citation));
}

#[test]
fn test_update_listeners_see_every_commit() {
    let mut editor = Editor::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    editor.add_update_listener(move |update| sink.borrow_mut().push(update.revision));

    editor.insert_content("<p>one</p>");
    editor.dispatch("InsertText", json!({"text": "!"}));
    assert!(editor.undo());
    assert_eq!(seen.borrow().len(), 3);
}

fn generic_html() -> impl Strategy<Value = String> {
    let inline = ("[a-z]{1,6}( [a-z]{1,6}){0,2}", 0usize..4).prop_map(|(text, fmt)| match fmt {
        0 => text,
        1 => format!("<strong>{text}</strong>"),
        2 => format!("<em>{text}</em>"),
        _ => format!("<u>{text}</u>"),
    });
    let block = (0usize..4, prop::collection::vec(inline, 1..4)).prop_map(|(kind, parts)| {
        let body = parts.join(" ");
        match kind {
            0 => format!("<p>{body}</p>"),
            1 => format!("<h2>{body}</h2>"),
            2 => format!("<blockquote>{body}</blockquote>"),
            _ => format!("<ul><li>{body}</li><li>{body}</li></ul>"),
        }
    });
    prop::collection::vec(block, 1..5).prop_map(|blocks| blocks.concat())
}

proptest! {
    #[test]
    fn prop_get_html_then_insert_content_keeps_text(html in generic_html()) {
        let mut source = Editor::new();
        source.load_initial_html(&html).unwrap();

        let mut copy = Editor::new();
        copy.insert_content(&source.get_html());
        prop_assert_eq!(copy.tree().text_content(), source.tree().text_content());
        prop_assert_eq!(copy.get_html(), source.get_html());
    }

    #[test]
    fn prop_typed_text_survives_insert_content_of_get_html(
        chunks in prop::collection::vec("[a-z ]{1,8}", 1..5)
    ) {
        let mut source = Editor::new();
        for chunk in &chunks {
            let payload = json!({"text": chunk});
            prop_assert!(source.dispatch("InsertText", payload));
        }

        let mut copy = Editor::new();
        copy.insert_content(&source.get_html());
        prop_assert_eq!(copy.tree().text_content(), chunks.concat());
        prop_assert_eq!(copy.get_html(), source.get_html());
    }
}
