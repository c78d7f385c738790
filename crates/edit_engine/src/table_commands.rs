//! Table insertion

use crate::position::{self, BlockAnchor};
use crate::{EditError, EditorCommand, InsertTable, Result, Transaction};
use doc_model::nodes::{create_table, create_table_cell, create_table_row, paragraph};
use doc_model::{FragmentNode, NodeType, Position};

/// A detached `rows` x `columns` table; every cell holds one empty
/// paragraph. With `include_headers` the first row is made of header cells.
pub fn build_table(rows: usize, columns: usize, include_headers: bool) -> FragmentNode {
    let rows = (0..rows)
        .map(|r| {
            let cells = (0..columns)
                .map(|_| {
                    FragmentNode::from_node(&create_table_cell(include_headers && r == 0))
                        .with_children(vec![FragmentNode::from_node(&paragraph())])
                })
                .collect();
            FragmentNode::from_node(&create_table_row()).with_children(cells)
        })
        .collect();
    FragmentNode::from_node(&create_table()).with_children(rows)
}

/// Insert a table after the block holding the caret, then move the caret
/// into the first cell
pub fn insert_table(command: &EditorCommand, tx: &mut Transaction<'_>) -> Result<bool> {
    let EditorCommand::InsertTable(InsertTable {
        rows,
        columns,
        include_headers,
    }) = command
    else {
        return Ok(false);
    };
    let limits = &tx.config().table;
    if *rows == 0 || *columns == 0 {
        return Err(EditError::invalid_payload("InsertTable", "a table needs at least one row and one column"));
    }
    if *rows > limits.max_rows || *columns > limits.max_columns {
        return Err(EditError::invalid_payload(
            "InsertTable",
            format!(
                "{rows}x{columns} exceeds the limit of {}x{}",
                limits.max_rows, limits.max_columns
            ),
        ));
    }

    let caret = tx.selection().focus;
    let (container, index) = match position::block_anchor(tx.tree(), tx.registry(), &caret)? {
        BlockAnchor::Between { container, index } => (container, index),
        BlockAnchor::Within { container, index, .. } => (container, index + 1),
    };

    let fragment = build_table(*rows, *columns, *include_headers);
    let table = tx.tree_mut().graft(&fragment, container, Some(index))?;

    let tree = tx.tree();
    let first_block = tree
        .subtree(table)
        .into_iter()
        .find(|&id| tree.node_type(id) == Some(&NodeType::PARAGRAPH));
    if let Some(block) = first_block {
        tx.set_caret(Position::start_of(block));
    }
    tracing::debug!(rows, columns, "inserted table");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EditorConfig;
    use doc_model::nodes::is_header_cell;
    use doc_model::{DocumentTree, Node, NodeRegistry, Selection};

    fn run(payload: InsertTable) -> Result<(DocumentTree, Selection)> {
        let registry = NodeRegistry::with_defaults();
        let config = EditorConfig::default();
        let mut tree = DocumentTree::new();
        let para = tree.append(paragraph(), tree.root_id()).unwrap();
        let text = tree.append(Node::text("Before"), para).unwrap();
        let mut tx = Transaction::new(tree, Selection::collapsed(Position::new(text, 3)), &registry, &config);
        insert_table(&EditorCommand::InsertTable(payload), &mut tx)?;
        tx.commit()
    }

    #[test]
    fn test_table_goes_after_current_block() {
        let (tree, selection) = run(InsertTable {
            rows: 2,
            columns: 3,
            include_headers: true,
        })
        .unwrap();
        let root = tree.root_id();
        let children = tree.children(root);
        assert_eq!(children.len(), 2);
        let table = children[1];
        assert_eq!(tree.node_type(table), Some(&NodeType::TABLE));
        let rows = tree.children(table);
        assert_eq!(rows.len(), 2);
        assert!(tree.children(rows[0]).iter().all(|&c| is_header_cell(tree.node(c).unwrap())));
        assert!(!tree.children(rows[1]).iter().any(|&c| is_header_cell(tree.node(c).unwrap())));
        assert!(tree.is_ancestor(table, selection.focus.node_id));
    }

    #[test]
    fn test_zero_or_oversized_tables_are_rejected() {
        for (rows, columns) in [(0, 2), (2, 0), (501, 1), (1, 65)] {
            let result = run(InsertTable {
                rows,
                columns,
                include_headers: false,
            });
            assert!(matches!(result, Err(EditError::InvalidPayload { .. })), "{rows}x{columns}");
        }
    }
}
