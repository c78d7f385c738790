//! Resolving selection positions against the tree

use crate::{EditError, Result};
use doc_model::nodes::paragraph;
use doc_model::{
    ContentModel, DocumentTree, Node, NodeId, NodeRegistry, NodeType, Position, Selection,
};
use std::cmp::Ordering;

/// A leaf covered (at least partly) by a range; offsets are chars for text
/// and 0..1 for decorators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoveredLeaf {
    pub id: NodeId,
    pub start: usize,
    pub end: usize,
    pub len: usize,
}

impl CoveredLeaf {
    pub fn is_whole(&self) -> bool {
        self.start == 0 && self.end == self.len
    }
}

/// Length of a leaf in position units
pub fn leaf_len(node: &Node) -> usize {
    match node.as_text() {
        Some(t) => t.char_len(),
        None if node.is_decorator() => 1,
        None => 0,
    }
}

fn is_leaf(node: &Node) -> bool {
    node.is_text() || node.is_decorator()
}

/// Plain `text` nodes in normal mode: the only nodes edited char by char
pub fn is_editable_text(node: &Node) -> bool {
    node.node_type() == &NodeType::TEXT && node.as_text().is_some_and(|t| !t.is_atomic())
}

/// Leaves that can only be removed whole
pub fn is_atomic_leaf(node: &Node) -> bool {
    node.is_atomic() || node.is_decorator()
}

/// Start and end of a selection in document order
pub fn ordered(tree: &DocumentTree, selection: &Selection) -> (Position, Position) {
    match tree.compare_positions(&selection.anchor, &selection.focus) {
        Some(Ordering::Greater) => (selection.focus, selection.anchor),
        _ => (selection.anchor, selection.focus),
    }
}

/// All text blocks (paragraphs, headings, list items, ...) in document order
pub fn text_blocks(tree: &DocumentTree, registry: &NodeRegistry) -> Vec<NodeId> {
    tree.descendants(tree.root_id())
        .into_iter()
        .filter(|&id| tree.node_type(id).is_some_and(|t| registry.is_text_block(t)))
        .collect()
}

/// The text block containing `id` (itself included)
pub fn enclosing_text_block(tree: &DocumentTree, registry: &NodeRegistry, id: NodeId) -> Option<NodeId> {
    std::iter::once(id)
        .chain(tree.ancestors(id))
        .find(|&n| tree.node_type(n).is_some_and(|t| registry.is_text_block(t)))
}

/// The ancestor-or-self of `id` whose parent holds blocks (the root or a
/// table cell)
pub fn block_in_container(tree: &DocumentTree, registry: &NodeRegistry, id: NodeId) -> Option<NodeId> {
    std::iter::once(id).chain(tree.ancestors(id)).find(|&n| {
        tree.parent(n)
            .and_then(|p| tree.node_type(p))
            .and_then(|t| registry.content(t))
            == Some(ContentModel::Blocks)
    })
}

/// Text blocks touched by a selection, in document order. Endpoints may sit
/// anywhere, including between blocks.
pub fn blocks_in_selection(tree: &DocumentTree, registry: &NodeRegistry, selection: &Selection) -> Vec<NodeId> {
    let (start, end) = ordered(tree, selection);
    if !tree.contains(start.node_id) || !tree.contains(end.node_id) {
        return Vec::new();
    }
    text_blocks(tree, registry)
        .into_iter()
        .filter(|&block| {
            let block_start = Position::new(block, 0);
            let block_end = Position::new(block, tree.children(block).len());
            matches!(
                tree.compare_positions(&block_end, &start),
                Some(Ordering::Greater | Ordering::Equal)
            ) && matches!(
                tree.compare_positions(&block_start, &end),
                Some(Ordering::Less | Ordering::Equal)
            )
        })
        .collect()
}

/// Text and decorator leaves under `id` in document order
pub fn inline_leaves(tree: &DocumentTree, id: NodeId) -> Vec<NodeId> {
    tree.descendants(id)
        .into_iter()
        .filter(|&n| tree.get(n).is_some_and(is_leaf))
        .collect()
}

/// Leaves inside the text blocks of `[start, end)` and how much of each the
/// range covers. Leaves covered by zero units are left out.
pub fn covered_leaves(
    tree: &DocumentTree,
    registry: &NodeRegistry,
    start: &Position,
    end: &Position,
) -> Vec<CoveredLeaf> {
    let selection = Selection::new(*start, *end);
    let mut out = Vec::new();
    for block in blocks_in_selection(tree, registry, &selection) {
        for leaf in inline_leaves(tree, block) {
            let Some(node) = tree.get(leaf) else { continue };
            let len = leaf_len(node);
            let leaf_start = Position::new(leaf, 0);
            let leaf_end = Position::new(leaf, len);

            let from = match tree.compare_positions(start, &leaf_start) {
                Some(Ordering::Less | Ordering::Equal) => 0,
                _ if start.node_id == leaf => start.offset.min(len),
                _ => len,
            };
            let to = match tree.compare_positions(end, &leaf_end) {
                Some(Ordering::Greater | Ordering::Equal) => len,
                _ if end.node_id == leaf => end.offset.min(len),
                _ => 0,
            };
            if from < to {
                out.push(CoveredLeaf {
                    id: leaf,
                    start: from,
                    end: to,
                    len,
                });
            }
        }
    }
    out
}

/// Turn a caret into a `(parent, index)` slot for inline content.
///
/// Editable text is split at the caret. Atomic text and decorators are
/// never entered: the slot lands before or after them. A caret between
/// blocks gets a fresh paragraph to hold the content.
pub fn inline_slot(tree: &mut DocumentTree, registry: &NodeRegistry, position: &Position) -> Result<(NodeId, usize)> {
    let node = tree.node(position.node_id)?;
    let id = node.id();

    if is_leaf(node) {
        let parent = node
            .parent()
            .ok_or_else(|| EditError::Invariant(format!("leaf {id} has no parent")))?;
        let index = tree.index_in_parent(id).unwrap_or(0);
        let len = leaf_len(node);
        let atomic = is_atomic_leaf(node);

        return Ok(match position.offset {
            0 => (parent, index),
            o if o >= len || atomic => (parent, index + 1),
            o => {
                tree.split_text(id, o)?;
                (parent, index + 1)
            }
        });
    }

    let content = registry.content(node.node_type());
    let index = position.offset.min(node.children().len());
    match content {
        Some(ContentModel::Inlines) => Ok((id, index)),
        Some(ContentModel::Blocks) => {
            let para = tree.insert(paragraph(), id, Some(index))?;
            Ok((para, 0))
        }
        _ => Err(EditError::ExecutionFailed(format!(
            "no inline position inside {}",
            node.node_type()
        ))),
    }
}

/// Where new blocks go relative to a caret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockAnchor {
    /// The caret sits directly in a block container, before child `index`
    Between { container: NodeId, index: usize },
    /// The caret is inside `block`, child `index` of `container`
    Within {
        container: NodeId,
        index: usize,
        block: NodeId,
    },
}

pub fn block_anchor(tree: &DocumentTree, registry: &NodeRegistry, caret: &Position) -> Result<BlockAnchor> {
    let node = tree.node(caret.node_id)?;
    if registry.content(node.node_type()) == Some(ContentModel::Blocks) {
        return Ok(BlockAnchor::Between {
            container: caret.node_id,
            index: caret.offset.min(node.children().len()),
        });
    }
    let block = block_in_container(tree, registry, caret.node_id)
        .ok_or_else(|| EditError::Invariant(format!("{} is outside every block container", caret.node_id)))?;
    let container = tree
        .parent(block)
        .ok_or_else(|| EditError::Invariant(format!("block {block} has no parent")))?;
    Ok(BlockAnchor::Within {
        container,
        index: tree.index_in_parent(block).unwrap_or(0),
        block,
    })
}

/// Caret at the end of the text block `block`
pub fn end_of_block(tree: &DocumentTree, block: NodeId) -> Position {
    let children = tree.children(block);
    match children.last().and_then(|&c| tree.get(c)) {
        Some(last) if is_editable_text(last) => Position::new(last.id(), leaf_len(last)),
        _ => Position::new(block, children.len()),
    }
}

/// A collapsed selection at the start of the first text block
pub fn first_caret(tree: &DocumentTree, registry: &NodeRegistry) -> Selection {
    match text_blocks(tree, registry).first() {
        Some(&block) => Selection::at_start_of(block),
        None => Selection::at_start_of(tree.root_id()),
    }
}

/// Clamp a position to the node it names; `None` if the node is gone
pub fn clamp(tree: &DocumentTree, position: &Position) -> Option<Position> {
    let node = tree.get(position.node_id)?;
    let max = if is_leaf(node) { leaf_len(node) } else { node.children().len() };
    Some(Position::new(position.node_id, position.offset.min(max)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::nodes::create_citation;

    fn setup() -> (DocumentTree, NodeRegistry, NodeId, NodeId) {
        let mut tree = DocumentTree::new();
        let para = tree.append(paragraph(), tree.root_id()).unwrap();
        let text = tree.append(Node::text("Hello world"), para).unwrap();
        (tree, NodeRegistry::with_defaults(), para, text)
    }

    #[test]
    fn test_inline_slot_splits_editable_text() {
        let (mut tree, registry, para, text) = setup();
        let slot = inline_slot(&mut tree, &registry, &Position::new(text, 5)).unwrap();
        assert_eq!(slot, (para, 1));
        assert_eq!(tree.children(para).len(), 2);
        assert_eq!(tree.node_text_content(text), "Hello");
    }

    #[test]
    fn test_inline_slot_never_enters_atomic_text() {
        let (mut tree, registry, para, _) = setup();
        let citation = tree.append(create_citation("(A, 1)"), para).unwrap();
        let slot = inline_slot(&mut tree, &registry, &Position::new(citation, 3)).unwrap();
        assert_eq!(slot, (para, 2));
        assert_eq!(tree.node_text_content(citation), "(A, 1)");
    }

    #[test]
    fn test_inline_slot_between_blocks_creates_paragraph() {
        let (mut tree, registry, para, _) = setup();
        let root = tree.root_id();
        let (holder, index) = inline_slot(&mut tree, &registry, &Position::new(root, 1)).unwrap();
        assert_ne!(holder, para);
        assert_eq!(index, 0);
        assert_eq!(tree.children(root).len(), 2);
    }

    #[test]
    fn test_covered_leaves() {
        let (mut tree, registry, para, text) = setup();
        let citation = tree.append(create_citation("(A, 1)"), para).unwrap();
        let covered = covered_leaves(&tree, &registry, &Position::new(text, 6), &Position::new(citation, 2));
        assert_eq!(covered.len(), 2);
        assert_eq!((covered[0].start, covered[0].end), (6, 11));
        assert!(!covered[1].is_whole());
    }

    #[test]
    fn test_blocks_in_selection() {
        let (mut tree, registry, para, text) = setup();
        let second = tree.append(paragraph(), tree.root_id()).unwrap();
        let sel = Selection::new(Position::new(second, 0), Position::new(text, 2));
        assert_eq!(blocks_in_selection(&tree, &registry, &sel), vec![para, second]);
        let root = tree.root_id();
        let between = Selection::at_start_of(root);
        assert!(blocks_in_selection(&tree, &registry, &between).is_empty());
        let all = Selection::new(Position::new(root, 0), Position::new(root, 2));
        assert_eq!(blocks_in_selection(&tree, &registry, &all), vec![para, second]);
    }
}
