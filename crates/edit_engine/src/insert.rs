//! Content insertion at the caret
//!
//! Used by the insert commands and by the editor bridge to place parsed
//! HTML or JSON fragments into the document.

use crate::position::{self, BlockAnchor};
use crate::{EditError, Result, Transaction};
use doc_model::nodes::placeholder_block;
use doc_model::{DocumentTree, Fragment, FragmentNode, Node, NodeId, NodeRegistry, Position};
use std::cmp::Ordering;

impl Transaction<'_> {
    /// Insert one inline node at the caret. The caret ends up right after it.
    pub fn insert_inline(&mut self, node: Node) -> Result<NodeId> {
        let caret = self.selection().focus;
        let registry = self.registry();
        let (parent, index) = position::inline_slot(self.tree_mut(), registry, &caret)?;
        let id = self.tree_mut().insert(node, parent, Some(index))?;
        self.set_caret(Position::new(parent, index + 1));
        Ok(id)
    }

    /// Insert a fragment at the caret.
    ///
    /// A purely inline fragment goes into the current text block. Anything
    /// holding blocks is inserted between blocks: an empty block at the caret
    /// is replaced, a caret at a block edge inserts before or after it, and a
    /// caret in the middle splits the block. Returns the top-level keys.
    pub fn insert_fragment(&mut self, fragment: &Fragment) -> Result<Vec<NodeId>> {
        if fragment.is_empty() {
            return Ok(Vec::new());
        }
        let registry = self.registry();
        let inline_only = fragment.iter().all(|n| registry.is_inline(&n.node_type));

        if inline_only {
            let caret = self.selection().focus;
            let (parent, index) = position::inline_slot(self.tree_mut(), registry, &caret)?;
            let ids = self.tree_mut().graft_all(fragment.iter(), parent, Some(index))?;
            let caret = match ids.last().and_then(|&id| self.tree().get(id)) {
                Some(last) if position::is_editable_text(last) => Position::new(last.id(), position::leaf_len(last)),
                _ => Position::new(parent, index + ids.len()),
            };
            self.set_caret(caret);
            return Ok(ids);
        }

        let blocks = wrap_inline_runs(registry, fragment);
        let (container, index) = self.block_slot()?;
        let ids = self.tree_mut().graft_all(blocks.iter(), container, Some(index))?;

        let tree = self.tree();
        let last_text_block = ids.last().and_then(|&last| {
            tree.subtree(last)
                .into_iter()
                .filter(|&n| tree.node_type(n).is_some_and(|t| registry.is_text_block(t)))
                .last()
        });
        let caret = match last_text_block {
            Some(block) => position::end_of_block(tree, block),
            None => Position::new(container, index + ids.len()),
        };
        self.set_caret(caret);
        Ok(ids)
    }

    /// Find (or make) a slot between blocks at the caret
    fn block_slot(&mut self) -> Result<(NodeId, usize)> {
        let caret = self.selection().focus;
        let registry = self.registry();
        let (container, index, block) = match position::block_anchor(self.tree(), registry, &caret)? {
            BlockAnchor::Between { container, index } => return Ok((container, index)),
            BlockAnchor::Within {
                container,
                index,
                block,
            } => (container, index, block),
        };

        let tree = self.tree();
        let is_text_block = tree.node_type(block).is_some_and(|t| registry.is_text_block(t));
        if !is_text_block {
            return Ok((container, index + 1));
        }

        let leaves: Vec<(NodeId, usize)> = position::inline_leaves(tree, block)
            .into_iter()
            .filter_map(|id| tree.get(id).map(|n| (id, position::leaf_len(n))))
            .filter(|&(_, len)| len > 0)
            .collect();

        let before = leaves.iter().any(|&(id, _)| {
            tree.compare_positions(&Position::new(id, 0), &caret) == Some(Ordering::Less)
        });
        let after = leaves.iter().any(|&(id, len)| {
            tree.compare_positions(&Position::new(id, len), &caret) == Some(Ordering::Greater)
        });

        if leaves.is_empty() {
            self.tree_mut().remove(block)?;
            return Ok((container, index));
        }

        match (before, after) {
            (_, false) => Ok((container, index + 1)),
            (false, true) => Ok((container, index)),
            (true, true) => {
                split_block(self.tree_mut(), registry, block, &caret)?;
                Ok((container, index + 1))
            }
        }
    }
}

/// Group runs of inline nodes into paragraphs so every top-level node is a
/// block
fn wrap_inline_runs(registry: &NodeRegistry, fragment: &Fragment) -> Vec<FragmentNode> {
    let mut out = Vec::new();
    let mut run: Option<FragmentNode> = None;
    for node in fragment.iter() {
        if registry.is_inline(&node.node_type) {
            run.get_or_insert_with(|| placeholder_block("")).push(node.clone());
        } else {
            out.extend(run.take());
            out.push(node.clone());
        }
    }
    out.extend(run);
    out
}

/// Split text block `block` at `at`. Inline wrappers between the caret and
/// the block are split too. The tail becomes a new block right after
/// `block`; its key is returned.
pub fn split_block(tree: &mut DocumentTree, registry: &NodeRegistry, block: NodeId, at: &Position) -> Result<NodeId> {
    let (mut parent, mut index) = position::inline_slot(tree, registry, at)?;

    while parent != block {
        let wrapper = parent;
        let up = tree
            .parent(wrapper)
            .ok_or_else(|| EditError::Invariant(format!("{wrapper} is not inside {block}")))?;
        let wrapper_index = tree.index_in_parent(wrapper).unwrap_or(0);
        let tail: Vec<NodeId> = tree.children(wrapper)[index..].to_vec();
        if !tail.is_empty() {
            let copy = tree.clone_node(wrapper)?;
            let copy_id = tree.insert(copy, up, Some(wrapper_index + 1))?;
            for id in tail {
                tree.move_node(id, copy_id, None)?;
            }
        }
        parent = up;
        index = wrapper_index + 1;
    }

    let container = tree
        .parent(block)
        .ok_or_else(|| EditError::Invariant(format!("block {block} has no parent")))?;
    let block_index = tree.index_in_parent(block).unwrap_or(0);
    let tail: Vec<NodeId> = tree.children(block)[index..].to_vec();
    let copy = tree.clone_node(block)?;
    let new_block = tree.insert(copy, container, Some(block_index + 1))?;
    for id in tail {
        tree.move_node(id, new_block, None)?;
    }
    Ok(new_block)
}
