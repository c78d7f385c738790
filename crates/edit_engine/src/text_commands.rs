//! Character-level editing: typing, deleting and formatting text

use crate::handlers::{isolate, remove_whole};
use crate::position::{self, CoveredLeaf};
use crate::{
    DeleteCharacter, DeleteText, EditError, EditorCommand, FormatText, InsertText, RemoveNode,
    Result, Transaction,
};
use doc_model::{DocModelError, Node, Position, Selection, TextFormat};
use std::cmp::Ordering;
use unicode_segmentation::UnicodeSegmentation;

// =============================================================================
// Insert Text
// =============================================================================

pub fn insert_text(command: &EditorCommand, tx: &mut Transaction<'_>) -> Result<bool> {
    let EditorCommand::InsertText(InsertText { text }) = command else {
        return Ok(false);
    };
    if text.is_empty() {
        return Ok(false);
    }
    let selection = tx.selection();
    if !selection.is_collapsed() {
        delete_range(tx, &selection)?;
    }

    let caret = tx.selection().focus;
    let inserted = text.chars().count();

    if tx.tree().get(caret.node_id).is_some_and(position::is_editable_text) {
        tx.tree_mut().splice_text(caret.node_id, caret.offset, 0, text)?;
        tx.set_caret(Position::new(caret.node_id, caret.offset + inserted));
        return Ok(true);
    }

    let registry = tx.registry();
    let (parent, index) = position::inline_slot(tx.tree_mut(), registry, &caret)?;
    let tree = tx.tree();

    // Extend a neighbouring plain text node rather than starting a new one.
    let editable_at = |i: usize| {
        tree.children(parent)
            .get(i)
            .and_then(|&id| tree.get(id))
            .filter(|n| position::is_editable_text(n))
            .map(|n| (n.id(), position::leaf_len(n)))
    };
    let previous = index.checked_sub(1).and_then(editable_at);
    let next = editable_at(index);

    if let Some((prev, len)) = previous {
        tx.tree_mut().splice_text(prev, len, 0, text)?;
        tx.set_caret(Position::new(prev, len + inserted));
        return Ok(true);
    }
    if let Some((next, _)) = next {
        tx.tree_mut().splice_text(next, 0, 0, text)?;
        tx.set_caret(Position::new(next, inserted));
        return Ok(true);
    }

    let id = tx.tree_mut().insert(Node::text(text.as_str()), parent, Some(index))?;
    tx.set_caret(Position::new(id, inserted));
    Ok(true)
}

// =============================================================================
// Delete Text / Delete Character
// =============================================================================

pub fn delete_text(command: &EditorCommand, tx: &mut Transaction<'_>) -> Result<bool> {
    let EditorCommand::DeleteText(DeleteText { range }) = command else {
        return Ok(false);
    };
    if range.is_collapsed() {
        return Ok(false);
    }
    delete_range(tx, range)
}

/// Delete everything covered by `range` within one text block.
///
/// Atomic leaves go whole or not at all: a range cutting into one is an
/// error, which rolls back the transaction.
pub(crate) fn delete_range(tx: &mut Transaction<'_>, range: &Selection) -> Result<bool> {
    let registry = tx.registry();
    let tree = tx.tree();
    let (start, end) = position::ordered(tree, range);

    let first = position::enclosing_text_block(tree, registry, start.node_id);
    let last = position::enclosing_text_block(tree, registry, end.node_id);
    if first.is_none() || first != last {
        return Err(EditError::ExecutionFailed(
            "deleting across blocks is not supported".into(),
        ));
    }

    let covered = position::covered_leaves(tree, registry, &start, &end);
    if covered.is_empty() {
        return Ok(false);
    }
    for leaf in &covered {
        if !leaf.is_whole() && position::is_atomic_leaf(tree.node(leaf.id)?) {
            return Err(DocModelError::AtomicNode(leaf.id).into());
        }
    }

    let start_removed = covered.iter().any(|c| c.id == start.node_id && c.is_whole());
    let caret = if start_removed {
        let first = covered[0].id;
        match tree.parent(first) {
            Some(parent) => Position::new(parent, tree.index_in_parent(first).unwrap_or(0)),
            None => start,
        }
    } else {
        start
    };

    let tree = tx.tree_mut();
    for leaf in covered.iter().rev() {
        if leaf.is_whole() {
            tree.remove(leaf.id)?;
        } else {
            tree.splice_text(leaf.id, leaf.start, leaf.end - leaf.start, "")?;
        }
    }
    tx.set_caret(caret);
    Ok(true)
}

pub fn delete_character(command: &EditorCommand, tx: &mut Transaction<'_>) -> Result<bool> {
    let EditorCommand::DeleteCharacter(DeleteCharacter { backward }) = command else {
        return Ok(false);
    };
    let backward = *backward;
    let selection = tx.selection();
    if !selection.is_collapsed() {
        return delete_range(tx, &selection);
    }

    let caret = selection.focus;
    let node = tx.tree().node(caret.node_id)?;
    let len = position::leaf_len(node);

    if position::is_editable_text(node) {
        let text = node.as_text().map(|t| t.text.clone()).unwrap_or_default();
        if backward && caret.offset > 0 {
            let from = previous_boundary(&text, caret.offset);
            tx.tree_mut().splice_text(caret.node_id, from, caret.offset - from, "")?;
            tx.set_caret(Position::new(caret.node_id, from));
            return Ok(true);
        }
        if !backward && caret.offset < len {
            let to = next_boundary(&text, caret.offset);
            tx.tree_mut().splice_text(caret.node_id, caret.offset, to - caret.offset, "")?;
            return Ok(true);
        }
    } else if position::is_atomic_leaf(node) && ((backward && caret.offset > 0) || (!backward && caret.offset < len)) {
        return remove_whole(tx, caret.node_id);
    }

    let registry = tx.registry();
    let tree = tx.tree();
    let Some(block) = position::enclosing_text_block(tree, registry, caret.node_id) else {
        return Ok(false);
    };
    let leaves: Vec<(doc_model::NodeId, usize)> = position::inline_leaves(tree, block)
        .into_iter()
        .filter_map(|id| tree.get(id).map(|n| (id, position::leaf_len(n))))
        .filter(|&(_, len)| len > 0)
        .collect();

    let neighbour = if backward {
        leaves.iter().rev().find(|&&(id, len)| {
            matches!(
                tree.compare_positions(&Position::new(id, len), &caret),
                Some(Ordering::Less | Ordering::Equal)
            )
        })
    } else {
        leaves.iter().find(|&&(id, _)| {
            matches!(
                tree.compare_positions(&Position::new(id, 0), &caret),
                Some(Ordering::Greater | Ordering::Equal)
            )
        })
    };
    let Some(&(id, len)) = neighbour else {
        return Ok(false);
    };

    let node = tree.node(id)?;
    if !position::is_editable_text(node) {
        return remove_whole(tx, id);
    }
    let text = node.as_text().map(|t| t.text.clone()).unwrap_or_default();
    if backward {
        let from = previous_boundary(&text, len);
        tx.tree_mut().splice_text(id, from, len - from, "")?;
        tx.set_caret(Position::new(id, from));
    } else {
        let to = next_boundary(&text, 0);
        tx.tree_mut().splice_text(id, 0, to, "")?;
        tx.set_caret(Position::new(id, 0));
    }
    Ok(true)
}

/// Char offsets of every grapheme boundary, 0 and the end included
fn grapheme_boundaries(text: &str) -> Vec<usize> {
    let mut out = vec![0];
    let mut acc = 0;
    for grapheme in text.graphemes(true) {
        acc += grapheme.chars().count();
        out.push(acc);
    }
    out
}

fn previous_boundary(text: &str, offset: usize) -> usize {
    grapheme_boundaries(text)
        .into_iter()
        .rev()
        .find(|&b| b < offset)
        .unwrap_or(0)
}

fn next_boundary(text: &str, offset: usize) -> usize {
    let boundaries = grapheme_boundaries(text);
    let end = boundaries.last().copied().unwrap_or(0);
    boundaries.into_iter().find(|&b| b > offset).unwrap_or(end)
}

// =============================================================================
// Format Text
// =============================================================================

/// Toggle one format flag over the selection. When every covered text node
/// already has the flag it is removed, otherwise it is added everywhere.
pub fn format_text(command: &EditorCommand, tx: &mut Transaction<'_>) -> Result<bool> {
    let EditorCommand::FormatText(FormatText { format }) = command else {
        return Ok(false);
    };
    let flag = TextFormat::from_command_name(format)
        .ok_or_else(|| EditError::invalid_payload("FormatText", format!("unknown format `{format}`")))?;

    let selection = tx.selection();
    if selection.is_collapsed() {
        return Ok(false);
    }
    let registry = tx.registry();
    let (start, end) = position::ordered(tx.tree(), &selection);
    let covered: Vec<CoveredLeaf> = position::covered_leaves(tx.tree(), registry, &start, &end)
        .into_iter()
        .filter(|c| tx.tree().get(c.id).is_some_and(Node::is_text))
        .collect();
    if covered.is_empty() {
        return Ok(false);
    }

    let mut ids = Vec::with_capacity(covered.len());
    for leaf in &covered {
        ids.push(isolate(tx.tree_mut(), leaf)?);
    }

    let formats: Vec<TextFormat> = ids
        .iter()
        .map(|&id| tx.tree().get(id).and_then(Node::as_text).map(|t| t.format).unwrap_or_default())
        .collect();
    let all_have = formats.iter().all(|f| f.contains(flag));

    for (&id, &current) in ids.iter().zip(&formats) {
        let next = if all_have {
            current - flag
        } else if current.contains(flag) {
            current
        } else {
            current.toggled(flag)
        };
        tx.tree_mut().set_text_format(id, next)?;
    }

    if let (Some(&first), Some(&last)) = (ids.first(), ids.last()) {
        let last_len = tx.tree().get(last).map(position::leaf_len).unwrap_or(0);
        tx.set_selection(Selection::new(Position::new(first, 0), Position::new(last, last_len)));
    }
    Ok(true)
}

// =============================================================================
// Remove Node
// =============================================================================

pub fn remove_node(command: &EditorCommand, tx: &mut Transaction<'_>) -> Result<bool> {
    let EditorCommand::RemoveNode(RemoveNode { node_id }) = command else {
        return Ok(false);
    };
    tx.tree().node(*node_id)?;
    remove_whole(tx, *node_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EditorConfig;
    use doc_model::nodes::{create_citation, create_image, paragraph, ImageProps};
    use doc_model::{DocumentTree, NodeId, NodeRegistry};

    struct Fixture {
        registry: NodeRegistry,
        config: EditorConfig,
        tree: DocumentTree,
        para: NodeId,
    }

    fn fixture(parts: &[Node]) -> (Fixture, Vec<NodeId>) {
        let mut tree = DocumentTree::new();
        let para = tree.append(paragraph(), tree.root_id()).unwrap();
        let ids = parts
            .iter()
            .map(|n| tree.append(n.fresh_copy(), para).unwrap())
            .collect();
        let fx = Fixture {
            registry: NodeRegistry::with_defaults(),
            config: EditorConfig::default(),
            tree,
            para,
        };
        (fx, ids)
    }

    fn run(fx: &Fixture, selection: Selection, command: EditorCommand) -> Result<(DocumentTree, Selection)> {
        let mut tx = Transaction::new(fx.tree.clone(), selection, &fx.registry, &fx.config);
        let handlers: [fn(&EditorCommand, &mut Transaction<'_>) -> Result<bool>; 5] =
            [insert_text, delete_text, delete_character, format_text, remove_node];
        let mut handled = false;
        for handler in handlers {
            if handler(&command, &mut tx)? {
                handled = true;
                break;
            }
        }
        assert!(handled, "command was not handled");
        tx.commit()
    }

    fn caret(id: NodeId, offset: usize) -> Selection {
        Selection::collapsed(Position::new(id, offset))
    }

    #[test]
    fn test_insert_text_into_editable_text() {
        let (fx, ids) = fixture(&[Node::text("Helo")]);
        let cmd = EditorCommand::InsertText(InsertText { text: "l".into() });
        let (tree, selection) = run(&fx, caret(ids[0], 2), cmd).unwrap();
        assert_eq!(tree.text_content(), "Hello");
        assert_eq!(selection.focus, Position::new(ids[0], 3));
    }

    #[test]
    fn test_insert_text_next_to_citation_does_not_enter_it() {
        let (fx, ids) = fixture(&[create_citation("(A, 1)")]);
        let cmd = EditorCommand::InsertText(InsertText { text: "!".into() });
        let (tree, _) = run(&fx, caret(ids[0], 6), cmd).unwrap();
        assert_eq!(tree.text_content(), "(A, 1)!");
        assert_eq!(tree.node_text_content(ids[0]), "(A, 1)");
    }

    #[test]
    fn test_insert_text_in_empty_paragraph() {
        let (fx, _) = fixture(&[]);
        let cmd = EditorCommand::InsertText(InsertText { text: "x".into() });
        let (tree, _) = run(&fx, caret(fx.para, 0), cmd).unwrap();
        assert_eq!(tree.text_content(), "x");
    }

    #[test]
    fn test_delete_range_across_text_and_whole_citation() {
        let (fx, ids) = fixture(&[Node::text("ab"), create_citation("(A, 1)"), Node::text("cd")]);
        let range = Selection::new(Position::new(ids[0], 1), Position::new(ids[2], 1));
        let (tree, selection) = run(&fx, range, EditorCommand::DeleteText(DeleteText { range })).unwrap();
        assert_eq!(tree.text_content(), "ad");
        assert_eq!(selection.focus, Position::new(ids[0], 1));
    }

    #[test]
    fn test_delete_range_cutting_into_citation_fails() {
        let (fx, ids) = fixture(&[Node::text("ab"), create_citation("(A, 1)")]);
        let range = Selection::new(Position::new(ids[0], 1), Position::new(ids[1], 2));
        let err = run(&fx, range, EditorCommand::DeleteText(DeleteText { range })).unwrap_err();
        assert!(matches!(err, EditError::DocModel(DocModelError::AtomicNode(_))));
    }

    #[test]
    fn test_backspace_removes_citation_whole() {
        let (fx, ids) = fixture(&[Node::text("ab"), create_citation("(A, 1)"), Node::text("cd")]);
        let cmd = EditorCommand::DeleteCharacter(DeleteCharacter { backward: true });
        let (tree, _) = run(&fx, caret(ids[2], 0), cmd).unwrap();
        assert_eq!(tree.text_content(), "abcd");
    }

    #[test]
    fn test_forward_delete_removes_image() {
        let image = create_image(&ImageProps::new("a.png", ""));
        let (fx, ids) = fixture(&[Node::text("ab"), image]);
        let cmd = EditorCommand::DeleteCharacter(DeleteCharacter { backward: false });
        let (tree, _) = run(&fx, caret(ids[0], 2), cmd).unwrap();
        assert!(!tree.contains(ids[1]));
    }

    #[test]
    fn test_backspace_removes_whole_grapheme() {
        let (fx, ids) = fixture(&[Node::text("ae\u{301}")]);
        let cmd = EditorCommand::DeleteCharacter(DeleteCharacter { backward: true });
        let (tree, selection) = run(&fx, caret(ids[0], 3), cmd).unwrap();
        assert_eq!(tree.text_content(), "a");
        assert_eq!(selection.focus.offset, 1);
    }

    #[test]
    fn test_format_toggles_on_then_off() {
        let (fx, ids) = fixture(&[Node::text("Hello world")]);
        let range = Selection::new(Position::new(ids[0], 0), Position::new(ids[0], 5));
        let bold = EditorCommand::FormatText(FormatText { format: "bold".into() });
        let (tree, selection) = run(&fx, range, bold.clone()).unwrap();
        let first = tree.get(selection.anchor.node_id).and_then(Node::as_text).unwrap();
        assert_eq!(first.text, "Hello");
        assert!(first.format.contains(TextFormat::BOLD));

        let fx = Fixture { tree, ..fx };
        let (tree, _) = run(&fx, selection, bold).unwrap();
        assert_eq!(tree.children(fx.para).len(), 1);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let (fx, ids) = fixture(&[Node::text("Hello")]);
        let range = Selection::new(Position::new(ids[0], 0), Position::new(ids[0], 5));
        let cmd = EditorCommand::FormatText(FormatText { format: "blink".into() });
        assert!(matches!(run(&fx, range, cmd), Err(EditError::InvalidPayload { .. })));
    }

    #[test]
    fn test_remove_node() {
        let (fx, ids) = fixture(&[Node::text("a"), create_citation("(A, 1)")]);
        let cmd = EditorCommand::RemoveNode(RemoveNode { node_id: ids[1] });
        let (tree, _) = run(&fx, caret(ids[0], 0), cmd).unwrap();
        assert_eq!(tree.text_content(), "a");
    }
}
