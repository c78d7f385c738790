//! Review comments over a range of inline content
//!
//! A comment becomes one or more `mark` nodes sharing a comment id: one per
//! run of adjacent covered leaves, so a range spanning several blocks gets a
//! marker in each.

use crate::handlers::isolate;
use crate::position;
use crate::{AddReviewComment, EditorCommand, Result, Transaction};
use doc_model::nodes::{create_review_mark, ReviewComment};
use doc_model::{NodeId, Position, Selection};
use uuid::Uuid;

pub fn add_review_comment(command: &EditorCommand, tx: &mut Transaction<'_>) -> Result<bool> {
    let EditorCommand::AddReviewComment(AddReviewComment { range, text }) = command else {
        return Ok(false);
    };
    let range = range.unwrap_or_else(|| tx.selection());
    if range.is_collapsed() {
        return Ok(false);
    }

    let registry = tx.registry();
    let (start, end) = position::ordered(tx.tree(), &range);
    let covered = position::covered_leaves(tx.tree(), registry, &start, &end);
    if covered.is_empty() {
        return Ok(false);
    }

    let mut ids = Vec::with_capacity(covered.len());
    for leaf in &covered {
        ids.push(isolate(tx.tree_mut(), leaf)?);
    }

    let mut runs: Vec<Vec<NodeId>> = Vec::new();
    for &id in &ids {
        let tree = tx.tree();
        let continues = runs
            .last()
            .and_then(|run| run.last())
            .is_some_and(|&prev| tree.next_sibling(prev) == Some(id));
        match runs.last_mut() {
            Some(run) if continues => run.push(id),
            _ => runs.push(vec![id]),
        }
    }

    let comment = ReviewComment::new(Uuid::new_v4().to_string(), text.as_str());
    for run in &runs {
        let tree = tx.tree_mut();
        let first = run[0];
        let Some(parent) = tree.parent(first) else { continue };
        let index = tree.index_in_parent(first).unwrap_or(0);
        let mark = tree.insert(create_review_mark(&comment), parent, Some(index))?;
        for &id in run {
            tree.move_node(id, mark, None)?;
        }
    }

    if let (Some(&first), Some(&last)) = (ids.first(), ids.last()) {
        let last_len = tx.tree().get(last).map(position::leaf_len).unwrap_or(0);
        tx.set_selection(Selection::new(Position::new(first, 0), Position::new(last, last_len)));
    }
    tracing::debug!(comment_id = %comment.comment_id, markers = runs.len(), "added review comment");
    Ok(true)
}
