//! List commands: wrapping blocks in lists, switching list type, lifting
//! items back out

use crate::position;
use crate::{ApplyListType, EditError, EditorCommand, Result, Transaction};
use doc_model::nodes::{create_list, create_list_item, list_type, paragraph, ListType};
use doc_model::{DocumentTree, NodeId, NodeType};

// =============================================================================
// Helper Functions
// =============================================================================

/// Move a list item out of its list to sit right after it. Items that
/// followed it move into a copy of the list placed after the lifted item.
pub fn lift_list_item(tree: &mut DocumentTree, item: NodeId) -> Result<()> {
    let list = tree
        .parent(item)
        .ok_or_else(|| EditError::Invariant(format!("list item {item} has no list")))?;
    let container = tree
        .parent(list)
        .ok_or_else(|| EditError::Invariant(format!("list {list} has no parent")))?;
    let list_index = tree.index_in_parent(list).unwrap_or(0);
    let item_index = tree.index_in_parent(item).unwrap_or(0);

    let following: Vec<NodeId> = tree.children(list)[item_index + 1..].to_vec();
    if !following.is_empty() {
        let tail = tree.clone_node(list)?;
        let tail_id = tree.insert(tail, container, Some(list_index + 1))?;
        for id in following {
            tree.move_node(id, tail_id, None)?;
        }
    }
    tree.move_node(item, container, Some(list_index + 1))?;
    Ok(())
}

fn in_table(tree: &DocumentTree, id: NodeId) -> bool {
    tree.ancestors(id)
        .into_iter()
        .any(|a| tree.node_type(a) == Some(&NodeType::TABLE))
}

/// Wrap a run of adjacent sibling blocks into one new list
fn wrap_in_list(tx: &mut Transaction<'_>, run: &[NodeId], kind: ListType) -> Result<()> {
    let Some(&first) = run.first() else {
        return Ok(());
    };
    let tree = tx.tree_mut();
    let container = tree
        .parent(first)
        .ok_or_else(|| EditError::Invariant(format!("block {first} has no parent")))?;
    let index = tree.index_in_parent(first).unwrap_or(0);
    let list = tree.insert(create_list(kind), container, Some(index))?;

    for &block in run {
        let tree = tx.tree_mut();
        let item = tree.replace_with(block, create_list_item())?;
        tree.move_node(item, list, None)?;
        tx.remap_node(block, item);
    }
    Ok(())
}

// =============================================================================
// Apply List Type
// =============================================================================

/// Turn the selected blocks into list items of the requested type, switch
/// existing lists to it, or (for `none`) lift items back into paragraphs.
/// Blocks inside tables are left alone.
pub fn apply_list_type(command: &EditorCommand, tx: &mut Transaction<'_>) -> Result<bool> {
    let EditorCommand::ApplyListType(ApplyListType { kind }) = command else {
        return Ok(false);
    };
    let blocks = position::blocks_in_selection(tx.tree(), tx.registry(), &tx.selection());
    if blocks.is_empty() {
        return Ok(false);
    }
    if blocks.iter().any(|&b| in_table(tx.tree(), b)) {
        tracing::debug!("list commands do not apply inside tables");
        return Ok(false);
    }

    let Some(target) = kind.list_type() else {
        let mut changed = false;
        for block in blocks {
            if tx.tree().node_type(block) != Some(&NodeType::LIST_ITEM) {
                continue;
            }
            lift_list_item(tx.tree_mut(), block)?;
            let para = tx.tree_mut().replace_with(block, paragraph())?;
            tx.remap_node(block, para);
            changed = true;
        }
        return Ok(changed);
    };

    // Group runs of adjacent non-list blocks before touching the tree.
    let mut runs: Vec<Vec<NodeId>> = Vec::new();
    let mut retype: Vec<NodeId> = Vec::new();
    let tree = tx.tree();
    for &block in &blocks {
        if tree.node_type(block) == Some(&NodeType::LIST_ITEM) {
            if let Some(list) = tree.parent(block) {
                if !retype.contains(&list) {
                    retype.push(list);
                }
            }
            runs.push(Vec::new());
            continue;
        }
        let adjacent = runs
            .last()
            .and_then(|run| run.last())
            .is_some_and(|&prev| tree.next_sibling(prev) == Some(block));
        match runs.last_mut() {
            Some(run) if adjacent => run.push(block),
            _ => runs.push(vec![block]),
        }
    }

    let mut changed = false;
    for list in retype {
        let current = tx.tree().get(list).and_then(list_type);
        if current != Some(target) {
            tx.tree_mut().set_element_attr(list, "listType", target.as_str().into())?;
            changed = true;
        }
    }
    for run in runs.iter().filter(|r| !r.is_empty()) {
        wrap_in_list(tx, run, target)?;
        changed = true;
    }
    tracing::debug!(?kind, changed, "applied list type");
    Ok(changed)
}
