//! Consistency pass run once per transaction before it commits

use crate::position::clamp;
use crate::{position, EditError, Result};
use doc_model::nodes::paragraph;
use doc_model::{ContentModel, DocumentTree, Node, NodeId, NodeRegistry, NodeType, Position, Selection};

/// Bring the tree back to canonical form, keeping `selection` pointed at the
/// same logical places:
///
/// - block containers hold no bare inline content (it is wrapped in
///   paragraphs)
/// - adjacent editable text nodes with equal formatting are merged
/// - empty editable text nodes, empty review marks and empty lists are
///   dropped
/// - the root holds at least one block
pub fn normalize(tree: &mut DocumentTree, registry: &NodeRegistry, selection: &mut Selection) -> Result<()> {
    wrap_stray_inlines(tree, registry, selection)?;

    for id in tree.subtree(tree.root_id()) {
        let holds_inlines = tree
            .node_type(id)
            .and_then(|t| registry.content(t))
            .is_some_and(|c| c == ContentModel::Inlines);
        if holds_inlines {
            normalize_inline_run(tree, id, selection)?;
        }
    }

    remove_empty_containers(tree, selection)?;

    let root = tree.root_id();
    if tree.children(root).is_empty() {
        let para = tree.append(paragraph(), root)?;
        *selection = Selection::at_start_of(para);
    }

    repair_selection(tree, registry, selection);
    Ok(())
}

/// Structural and content-model validation of a committed tree
pub fn validate(tree: &DocumentTree, registry: &NodeRegistry) -> Result<()> {
    tree.validate()?;
    for node in tree.iter() {
        let Some(parent) = node.parent() else { continue };
        let parent_type = tree
            .node_type(parent)
            .ok_or_else(|| EditError::Invariant(format!("dangling parent of {}", node.id())))?;
        if !registry.accepts_child(parent_type, node.node_type()) {
            return Err(EditError::Invariant(format!(
                "{} cannot contain {}",
                parent_type,
                node.node_type()
            )));
        }
    }
    Ok(())
}

fn map_positions(selection: &mut Selection, mut f: impl FnMut(Position) -> Position) {
    selection.anchor = f(selection.anchor);
    selection.focus = f(selection.focus);
}

/// Fix up positions after child `index` of `parent` (node `removed`) is gone
fn child_removed(selection: &mut Selection, parent: NodeId, index: usize, removed: NodeId) {
    map_positions(selection, |p| {
        if p.node_id == removed {
            Position::new(parent, index)
        } else if p.node_id == parent && p.offset > index {
            Position::new(parent, p.offset - 1)
        } else {
            p
        }
    });
}

fn is_plain_text(node: &Node) -> bool {
    node.node_type() == &NodeType::TEXT && node.as_text().is_some_and(|t| !t.is_atomic())
}

fn normalize_inline_run(tree: &mut DocumentTree, parent: NodeId, selection: &mut Selection) -> Result<()> {
    let mut i = 0;
    while i < tree.children(parent).len() {
        let id = tree.children(parent)[i];
        let node = tree.node(id)?;

        if is_plain_text(node) && node.as_text().is_some_and(|t| t.text.is_empty()) {
            tree.remove(id)?;
            child_removed(selection, parent, i, id);
            continue;
        }

        let Some(&next_id) = tree.children(parent).get(i + 1) else {
            break;
        };
        let next = tree.node(next_id)?;
        let mergeable = is_plain_text(node)
            && is_plain_text(next)
            && node.as_text().map(|t| t.format) == next.as_text().map(|t| t.format);
        if !mergeable {
            i += 1;
            continue;
        }

        let len = position::leaf_len(node);
        let tail = next.as_text().map(|t| t.text.clone()).unwrap_or_default();
        tree.splice_text(id, len, 0, &tail)?;
        tree.remove(next_id)?;
        map_positions(selection, |p| {
            if p.node_id == next_id {
                Position::new(id, len + p.offset)
            } else {
                p
            }
        });
        child_removed(selection, parent, i + 1, next_id);
    }
    Ok(())
}

fn wrap_stray_inlines(tree: &mut DocumentTree, registry: &NodeRegistry, selection: &mut Selection) -> Result<()> {
    let containers: Vec<NodeId> = tree
        .subtree(tree.root_id())
        .into_iter()
        .filter(|&id| {
            tree.node_type(id)
                .and_then(|t| registry.content(t))
                .is_some_and(|c| c == ContentModel::Blocks)
        })
        .collect();

    for container in containers {
        let mut i = 0;
        while i < tree.children(container).len() {
            let is_inline = |tree: &DocumentTree, id: NodeId| tree.node_type(id).is_some_and(|t| registry.is_inline(t));
            if !is_inline(tree, tree.children(container)[i]) {
                i += 1;
                continue;
            }
            let start = i;
            let mut end = i;
            while end < tree.children(container).len() && is_inline(tree, tree.children(container)[end]) {
                end += 1;
            }
            let run: Vec<NodeId> = tree.children(container)[start..end].to_vec();
            let para = tree.insert(paragraph(), container, Some(start))?;
            for id in run {
                tree.move_node(id, para, None)?;
            }
            tracing::trace!(count = end - start, "wrapped stray inline nodes in a paragraph");

            let width = end - start;
            map_positions(selection, |p| {
                if p.node_id != container {
                    return p;
                }
                match p.offset {
                    o if o <= start => p,
                    o if o < end => Position::new(para, o - start),
                    o => Position::new(container, o - width + 1),
                }
            });
            i = start + 1;
        }
    }
    Ok(())
}

fn remove_empty_containers(tree: &mut DocumentTree, selection: &mut Selection) -> Result<()> {
    loop {
        let empty: Option<NodeId> = tree.iter().find_map(|n| {
            let prunable = n.node_type() == &NodeType::MARK || n.node_type() == &NodeType::LIST;
            (prunable && n.children().is_empty()).then(|| n.id())
        });
        let Some(id) = empty else { return Ok(()) };
        let parent = tree
            .parent(id)
            .ok_or_else(|| EditError::Invariant(format!("{id} has no parent")))?;
        let index = tree.index_in_parent(id).unwrap_or(0);
        tree.remove(id)?;
        child_removed(selection, parent, index, id);
    }
}

fn repair_selection(tree: &DocumentTree, registry: &NodeRegistry, selection: &mut Selection) {
    let fallback = position::first_caret(tree, registry).focus;
    map_positions(selection, |p| clamp(tree, &p).unwrap_or(fallback));
}
