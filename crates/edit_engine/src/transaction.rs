//! Transactions: one atomic batch of tree mutations
//!
//! A transaction works on a private copy of the tree. Committing runs the
//! consistency pass and structural validation; dropping it discards every
//! change, which is how a failed command rolls back.

use crate::{normalize, EditorConfig, Result};
use doc_model::{DocumentTree, NodeId, NodeRegistry, Position, Selection};

pub struct Transaction<'a> {
    tree: DocumentTree,
    selection: Selection,
    registry: &'a NodeRegistry,
    config: &'a EditorConfig,
}

impl<'a> Transaction<'a> {
    pub fn new(
        tree: DocumentTree,
        selection: Selection,
        registry: &'a NodeRegistry,
        config: &'a EditorConfig,
    ) -> Self {
        Self {
            tree,
            selection,
            registry,
            config,
        }
    }

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DocumentTree {
        &mut self.tree
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    pub fn set_caret(&mut self, position: Position) {
        self.selection = Selection::collapsed(position);
    }

    pub fn registry(&self) -> &'a NodeRegistry {
        self.registry
    }

    pub fn config(&self) -> &'a EditorConfig {
        self.config
    }

    /// Point selection endpoints on `old` at `new` instead, keeping offsets
    pub fn remap_node(&mut self, old: NodeId, new: NodeId) {
        for pos in [&mut self.selection.anchor, &mut self.selection.focus] {
            if pos.node_id == old {
                pos.node_id = new;
            }
        }
    }

    /// Normalize, validate and hand back the new state
    pub fn commit(self) -> Result<(DocumentTree, Selection)> {
        let Transaction {
            mut tree,
            mut selection,
            registry,
            ..
        } = self;
        normalize::normalize(&mut tree, registry, &mut selection)?;
        normalize::validate(&tree, registry)?;
        Ok((tree, selection))
    }
}

impl std::fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("nodes", &self.tree.len())
            .field("selection", &self.selection)
            .finish()
    }
}
