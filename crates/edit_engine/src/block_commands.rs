//! Block type commands (paragraph, headings, quote)

use crate::list_commands::lift_list_item;
use crate::position;
use crate::{ApplyBlockType, BlockKind, EditorCommand, Result, Transaction};
use doc_model::nodes::{heading, paragraph, quote};
use doc_model::{Node, NodeType};

/// Fresh, empty block node for `kind`
pub fn block_node(kind: BlockKind) -> Node {
    match (kind, kind.heading_tag()) {
        (_, Some(tag)) => heading(tag),
        (BlockKind::Quote, None) => quote(),
        _ => paragraph(),
    }
}

/// Re-type every text block touched by the selection. List items are lifted
/// out of their list first.
pub fn apply_block_type(command: &EditorCommand, tx: &mut Transaction<'_>) -> Result<bool> {
    let EditorCommand::ApplyBlockType(ApplyBlockType { kind }) = command else {
        return Ok(false);
    };
    let blocks = position::blocks_in_selection(tx.tree(), tx.registry(), &tx.selection());
    if blocks.is_empty() {
        return Ok(false);
    }

    let mut changed = false;
    for block in blocks {
        let target = block_node(*kind);
        let node = tx.tree().node(block)?;
        if node.same_content(&target) {
            continue;
        }
        if node.node_type() == &NodeType::LIST_ITEM {
            lift_list_item(tx.tree_mut(), block)?;
        }
        let replacement = tx.tree_mut().replace_with(block, target)?;
        tx.remap_node(block, replacement);
        changed = true;
    }
    tracing::debug!(?kind, changed, "applied block type");
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EditorConfig;
    use doc_model::nodes::{create_list, create_list_item, heading_tag, HeadingTag, ListType};
    use doc_model::{DocumentTree, NodeRegistry, Position, Selection};

    #[test]
    fn test_paragraph_becomes_heading_and_keeps_caret_offset() {
        let registry = NodeRegistry::with_defaults();
        let config = EditorConfig::default();
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let para = tree.append(paragraph(), root).unwrap();
        tree.append(Node::text("Chapter 1"), para).unwrap();

        let mut tx = Transaction::new(tree, Selection::collapsed(Position::new(para, 1)), &registry, &config);
        let cmd = EditorCommand::ApplyBlockType(ApplyBlockType { kind: BlockKind::H1 });
        assert!(apply_block_type(&cmd, &mut tx).unwrap());
        let (tree, selection) = tx.commit().unwrap();

        let block = tree.children(root)[0];
        assert_eq!(heading_tag(tree.node(block).unwrap()), Some(HeadingTag::H1));
        assert_eq!(selection.focus, Position::new(block, 1));
        assert_eq!(tree.text_content(), "Chapter 1");
    }

    #[test]
    fn test_same_type_is_a_no_op() {
        let registry = NodeRegistry::with_defaults();
        let config = EditorConfig::default();
        let tree = DocumentTree::with_empty_paragraph();
        let para = tree.children(tree.root_id())[0];
        let mut tx = Transaction::new(tree, Selection::at_start_of(para), &registry, &config);
        let cmd = EditorCommand::ApplyBlockType(ApplyBlockType { kind: BlockKind::Paragraph });
        assert!(!apply_block_type(&cmd, &mut tx).unwrap());
    }

    #[test]
    fn test_middle_list_item_is_lifted_and_list_split() {
        let registry = NodeRegistry::with_defaults();
        let config = EditorConfig::default();
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let list = tree.append(create_list(ListType::Bullet), root).unwrap();
        let mut items = Vec::new();
        for text in ["a", "b", "c"] {
            let item = tree.append(create_list_item(), list).unwrap();
            tree.append(Node::text(text), item).unwrap();
            items.push(item);
        }

        let mut tx = Transaction::new(tree, Selection::at_start_of(items[1]), &registry, &config);
        let cmd = EditorCommand::ApplyBlockType(ApplyBlockType { kind: BlockKind::Quote });
        assert!(apply_block_type(&cmd, &mut tx).unwrap());
        let (tree, _) = tx.commit().unwrap();

        let types: Vec<_> = tree.children(root).iter().filter_map(|&c| tree.node_type(c).cloned()).collect();
        assert_eq!(types, vec![NodeType::LIST, NodeType::QUOTE, NodeType::LIST]);
        assert_eq!(tree.text_content(), "a\nb\nc");
    }
}
