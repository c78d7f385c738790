//! Undo/redo history of committed transactions
//!
//! Each entry is a full snapshot of the state before (undo) or after (redo)
//! a transaction. Trees are cloned per commit anyway, so a snapshot costs one
//! move.

use crate::{EditError, Result};
use doc_model::{DocumentTree, Selection};
use std::collections::VecDeque;
use std::time::Instant;

/// Document state at a transaction boundary
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub tree: DocumentTree,
    pub selection: Selection,
    /// What produced the change (command type or update label)
    pub label: String,
    pub timestamp: Instant,
}

impl Snapshot {
    pub fn new(tree: DocumentTree, selection: Selection, label: impl Into<String>) -> Self {
        Self {
            tree,
            selection,
            label: label.into(),
            timestamp: Instant::now(),
        }
    }
}

/// Bounded undo stack plus redo stack
#[derive(Debug)]
pub struct History {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: Vec<Snapshot>,
    max_entries: usize,
}

impl History {
    pub fn new(max_entries: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_entries,
        }
    }

    /// Record the state from before a commit; clears the redo stack
    pub fn push(&mut self, before: Snapshot) {
        self.redo_stack.clear();
        if self.max_entries == 0 {
            return;
        }
        self.undo_stack.push_back(before);
        while self.undo_stack.len() > self.max_entries {
            self.undo_stack.pop_front();
        }
    }

    /// Swap `current` for the most recent undo snapshot
    pub fn undo(&mut self, current: Snapshot) -> Result<Snapshot> {
        let previous = self.undo_stack.pop_back().ok_or(EditError::UndoStackEmpty)?;
        self.redo_stack.push(Snapshot {
            label: previous.label.clone(),
            ..current
        });
        Ok(previous)
    }

    /// Swap `current` for the most recent redo snapshot
    pub fn redo(&mut self, current: Snapshot) -> Result<Snapshot> {
        let next = self.redo_stack.pop().ok_or(EditError::RedoStackEmpty)?;
        self.undo_stack.push_back(Snapshot {
            label: next.label.clone(),
            ..current
        });
        Ok(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Label of the step `undo` would revert
    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.back().map(|s| s.label.as_str())
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(label: &str) -> Snapshot {
        let tree = DocumentTree::with_empty_paragraph();
        let selection = Selection::at_start_of(tree.root_id());
        Snapshot::new(tree, selection, label)
    }

    #[test]
    fn test_bounded() {
        let mut history = History::new(2);
        history.push(snap("a"));
        history.push(snap("b"));
        history.push(snap("c"));
        assert_eq!(history.undo_len(), 2);
        assert_eq!(history.undo_label(), Some("c"));
    }

    #[test]
    fn test_undo_then_redo() {
        let mut history = History::new(10);
        history.push(snap("edit"));
        let restored = history.undo(snap("now")).unwrap();
        assert_eq!(restored.label, "edit");
        assert!(history.can_redo());
        history.redo(snap("then")).unwrap();
        assert!(history.can_undo());
        assert!(matches!(history.redo(snap("x")), Err(EditError::RedoStackEmpty)));
    }

    #[test]
    fn test_new_push_clears_redo() {
        let mut history = History::new(10);
        history.push(snap("one"));
        history.undo(snap("now")).unwrap();
        history.push(snap("two"));
        assert!(!history.can_redo());
    }
}
