//! Default command handlers and the helpers they share

use crate::bus::{CommandBus, CommandPriority};
use crate::position::{self, CoveredLeaf};
use crate::{
    block_commands, citation_commands, comment_commands, image_commands, list_commands,
    table_commands, text_commands, CommandKind, EditError, Result, Transaction,
};
use doc_model::{DocumentTree, NodeId, Position};

/// Register the built-in handler of every command kind.
///
/// Defaults sit in the `Low` tier so that any handler registered later at
/// `Normal` or `High` runs first.
pub fn register_defaults(bus: &mut CommandBus) {
    let low = CommandPriority::Low;
    bus.register(CommandKind::ApplyBlockType, low, block_commands::apply_block_type);
    bus.register(CommandKind::ApplyListType, low, list_commands::apply_list_type);
    bus.register(CommandKind::InsertCitation, low, citation_commands::insert_citation);
    bus.register(CommandKind::InsertImage, low, image_commands::insert_image);
    bus.register(CommandKind::InsertTable, low, table_commands::insert_table);
    bus.register(CommandKind::AddReviewComment, low, comment_commands::add_review_comment);
    bus.register(CommandKind::InsertText, low, text_commands::insert_text);
    bus.register(CommandKind::DeleteText, low, text_commands::delete_text);
    bus.register(CommandKind::DeleteCharacter, low, text_commands::delete_character);
    bus.register(CommandKind::FormatText, low, text_commands::format_text);
    bus.register(CommandKind::RemoveNode, low, text_commands::remove_node);
}

/// Split a partly covered editable leaf so that exactly the covered part is
/// its own node; returns that node. Atomic leaves are returned whole.
pub(crate) fn isolate(tree: &mut DocumentTree, leaf: &CoveredLeaf) -> Result<NodeId> {
    let node = tree.node(leaf.id)?;
    if leaf.is_whole() || position::is_atomic_leaf(node) {
        return Ok(leaf.id);
    }
    if leaf.end < leaf.len {
        tree.split_text(leaf.id, leaf.end)?;
    }
    if leaf.start > 0 {
        return Ok(tree.split_text(leaf.id, leaf.start)?);
    }
    Ok(leaf.id)
}

/// Remove a node and put the caret where it was
pub(crate) fn remove_whole(tx: &mut Transaction<'_>, id: NodeId) -> Result<bool> {
    let tree = tx.tree_mut();
    let parent = tree
        .parent(id)
        .ok_or_else(|| EditError::ExecutionFailed("the root cannot be removed".into()))?;
    let index = tree.index_in_parent(id).unwrap_or(0);
    tree.remove(id)?;
    tx.set_caret(Position::new(parent, index));
    Ok(true)
}

/// Collapse a ranged selection to its end so inserts land after it
pub(crate) fn collapse_to_end(tx: &mut Transaction<'_>) {
    let selection = tx.selection();
    if !selection.is_collapsed() {
        let (_, end) = position::ordered(tx.tree(), &selection);
        tx.set_caret(end);
    }
}
