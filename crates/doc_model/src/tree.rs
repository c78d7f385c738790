//! Document tree storage and structural operations
//!
//! Nodes live in an arena keyed by `NodeId`. A node's parent is a key, not a
//! reference, and each child key appears in exactly one parent's child list.

use crate::{
    DocModelError, FragmentNode, Node, NodeBody, NodeId, NodeType, Position, Result, TextFormat,
};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// The complete document tree
#[derive(Debug, Clone)]
pub struct DocumentTree {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentTree {
    /// Create a tree holding only an empty root
    pub fn new() -> Self {
        let root = Node::element(NodeType::ROOT);
        let root_id = root.id();
        let mut nodes = HashMap::new();
        nodes.insert(root_id, root);
        Self { nodes, root: root_id }
    }

    /// Create a document tree with a single empty paragraph
    pub fn with_empty_paragraph() -> Self {
        let mut root = Node::element(NodeType::ROOT);
        let mut paragraph = crate::nodes::paragraph();
        let (root_id, paragraph_id) = (root.id(), paragraph.id());
        paragraph.set_parent(Some(root_id));
        root.children_mut().push(paragraph_id);

        let mut nodes = HashMap::new();
        nodes.insert(root_id, root);
        nodes.insert(paragraph_id, paragraph);
        Self { nodes, root: root_id }
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// Number of nodes including the root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Like `get`, but a missing key is an error
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or(DocModelError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(&id).ok_or(DocModelError::NodeNotFound(id))
    }

    pub fn node_type(&self, id: NodeId) -> Option<&NodeType> {
        self.get(id).map(Node::node_type)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    /// Child keys in order; empty for leaves and unknown keys
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(Node::children).unwrap_or(&[])
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let index = self.index_in_parent(id)?;
        let parent = self.parent(id)?;
        index.checked_sub(1).map(|i| self.children(parent)[i])
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let index = self.index_in_parent(id)?;
        let parent = self.parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    /// Iterate over all nodes in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    // =========================================================================
    // Insertion and removal
    // =========================================================================

    /// Insert a detached, childless node under `parent` at `index`
    /// (`None` appends)
    pub fn insert(&mut self, mut node: Node, parent: NodeId, index: Option<usize>) -> Result<NodeId> {
        let id = node.id();
        if self.nodes.contains_key(&id) {
            return Err(DocModelError::TreeStructure(format!("node {id} is already in the tree")));
        }
        if node.parent().is_some() || !node.children().is_empty() {
            return Err(DocModelError::InvalidOperation(
                "only detached, childless nodes can be inserted".into(),
            ));
        }

        let parent_node = self.node_mut(parent)?;
        if !parent_node.is_element() {
            return Err(DocModelError::InvalidOperation(format!(
                "{} nodes cannot hold children",
                parent_node.node_type()
            )));
        }
        let children = parent_node.children_mut();
        let index = index.unwrap_or(children.len());
        if index > children.len() {
            return Err(DocModelError::InvalidOffset { node_id: parent, offset: index });
        }
        children.insert(index, id);

        node.set_parent(Some(parent));
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Append a detached node as the last child of `parent`
    pub fn append(&mut self, node: Node, parent: NodeId) -> Result<NodeId> {
        self.insert(node, parent, None)
    }

    /// Materialize a fragment node and its descendants under `parent`,
    /// minting fresh keys
    pub fn graft(&mut self, fragment: &FragmentNode, parent: NodeId, index: Option<usize>) -> Result<NodeId> {
        let id = self.insert(fragment.to_node(), parent, index)?;
        for child in &fragment.children {
            self.graft(child, id, None)?;
        }
        Ok(id)
    }

    /// Graft a run of siblings starting at `index`; returns the new keys in
    /// order
    pub fn graft_all<'a, I>(&mut self, fragments: I, parent: NodeId, index: Option<usize>) -> Result<Vec<NodeId>>
    where
        I: IntoIterator<Item = &'a FragmentNode>,
    {
        let mut next = match index {
            Some(i) => i,
            None => self.children(parent).len(),
        };
        let mut ids = Vec::new();
        for fragment in fragments {
            ids.push(self.graft(fragment, parent, Some(next))?);
            next += 1;
        }
        Ok(ids)
    }

    fn detach(&mut self, id: NodeId) -> Result<()> {
        if let Some(parent) = self.node(id)?.parent() {
            self.node_mut(parent)?.children_mut().retain(|&c| c != id);
        }
        self.node_mut(id)?.set_parent(None);
        Ok(())
    }

    /// Re-parent a node (with its subtree) under `new_parent` at `index`.
    ///
    /// `index` is interpreted after the node has been detached, so moving
    /// within the same parent uses the final position.
    pub fn move_node(&mut self, id: NodeId, new_parent: NodeId, index: Option<usize>) -> Result<()> {
        if id == self.root {
            return Err(DocModelError::InvalidOperation("the root cannot be moved".into()));
        }
        if id == new_parent || self.is_ancestor(id, new_parent) {
            return Err(DocModelError::TreeStructure(format!(
                "moving {id} under {new_parent} would create a cycle"
            )));
        }
        if !self.node(new_parent)?.is_element() {
            return Err(DocModelError::InvalidOperation("target cannot hold children".into()));
        }

        self.detach(id)?;
        let children = self.node_mut(new_parent)?.children_mut();
        let index = index.unwrap_or(children.len()).min(children.len());
        children.insert(index, id);
        self.node_mut(id)?.set_parent(Some(new_parent));
        Ok(())
    }

    /// Remove a node and its subtree, returning a detached copy of it
    pub fn remove(&mut self, id: NodeId) -> Result<FragmentNode> {
        if id == self.root {
            return Err(DocModelError::InvalidOperation("the root cannot be removed".into()));
        }
        let copy = self.copy_subtree(id)?;
        self.detach(id)?;
        for gone in self.subtree(id) {
            self.nodes.remove(&gone);
        }
        Ok(copy)
    }

    /// Put `replacement` where `id` is, moving `id`'s children into it.
    ///
    /// Type tags never change in place; re-typing a block goes through here.
    pub fn replace_with(&mut self, id: NodeId, replacement: Node) -> Result<NodeId> {
        let old = self.node(id)?;
        let parent = old
            .parent()
            .ok_or_else(|| DocModelError::InvalidOperation("the root cannot be replaced".into()))?;
        if !old.children().is_empty() && !replacement.is_element() {
            return Err(DocModelError::InvalidOperation(format!(
                "{} cannot take over the children of {}",
                replacement.node_type(),
                old.node_type()
            )));
        }
        let index = self.index_in_parent(id).unwrap_or(0);
        let children = old.children().to_vec();

        let new_id = self.insert(replacement, parent, Some(index))?;
        for child in children {
            self.move_node(child, new_id, None)?;
        }
        self.detach(id)?;
        self.nodes.remove(&id);
        Ok(new_id)
    }

    /// Deep copy of a subtree as a detached fragment
    pub fn copy_subtree(&self, id: NodeId) -> Result<FragmentNode> {
        let node = self.node(id)?;
        let mut fragment = FragmentNode::from_node(node);
        for &child in node.children() {
            fragment.push(self.copy_subtree(child)?);
        }
        Ok(fragment)
    }

    /// Shallow clone: same type and payload under a new key, no children
    pub fn clone_node(&self, id: NodeId) -> Result<Node> {
        Ok(self.node(id)?.fresh_copy())
    }

    // =========================================================================
    // Payload edits
    // =========================================================================

    /// Replace `delete` chars at char offset `start` with `insert`.
    ///
    /// Atomic text cannot be spliced; it is removed with `remove`.
    pub fn splice_text(&mut self, id: NodeId, start: usize, delete: usize, insert: &str) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.is_atomic() {
            return Err(DocModelError::AtomicNode(id));
        }
        let text = node
            .text_mut()
            .ok_or_else(|| DocModelError::InvalidOperation(format!("{id} is not a text node")))?;

        let from = byte_index(&text.text, start).ok_or(DocModelError::InvalidOffset { node_id: id, offset: start })?;
        let to = byte_index(&text.text, start + delete).ok_or(DocModelError::InvalidOffset {
            node_id: id,
            offset: start + delete,
        })?;
        text.text.replace_range(from..to, insert);
        Ok(())
    }

    /// Split an editable text node at a char offset. The tail becomes a new
    /// next sibling with the same format; its key is returned.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Result<NodeId> {
        let node = self.node(id)?;
        if node.is_atomic() {
            return Err(DocModelError::AtomicNode(id));
        }
        let text = node
            .as_text()
            .ok_or_else(|| DocModelError::InvalidOperation(format!("{id} is not a text node")))?;
        let at = byte_index(&text.text, offset).ok_or(DocModelError::InvalidOffset { node_id: id, offset })?;

        let mut tail = text.clone();
        tail.text = text.text[at..].to_string();
        let tail_node = Node::new(node.node_type().clone(), NodeBody::Text(tail));

        let parent = node
            .parent()
            .ok_or_else(|| DocModelError::TreeStructure(format!("text node {id} has no parent")))?;
        let index = self.index_in_parent(id).unwrap_or(0);

        if let Some(t) = self.node_mut(id)?.text_mut() {
            t.text.truncate(at);
        }
        self.insert(tail_node, parent, Some(index + 1))
    }

    pub fn set_text_format(&mut self, id: NodeId, format: TextFormat) -> Result<()> {
        let text = self
            .node_mut(id)?
            .text_mut()
            .ok_or_else(|| DocModelError::InvalidOperation(format!("{id} is not a text node")))?;
        text.format = format;
        Ok(())
    }

    /// Set an attribute of an element node. Decorators are immutable.
    pub fn set_element_attr(&mut self, id: NodeId, key: &str, value: serde_json::Value) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.is_decorator() {
            return Err(DocModelError::ImmutableNode(id));
        }
        let element = node
            .element_mut()
            .ok_or_else(|| DocModelError::InvalidOperation(format!("{id} is not an element")))?;
        element.set_attr(key, value);
        Ok(())
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// `id` followed by all its descendants, depth-first pre-order
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if !self.contains(next) {
                continue;
            }
            out.push(next);
            stack.extend(self.children(next).iter().rev());
        }
        out
    }

    /// Descendants of `id` in document order, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut all = self.subtree(id);
        if !all.is_empty() {
            all.remove(0);
        }
        all
    }

    /// Parent, grandparent, ... up to the root
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(p) = current {
            out.push(p);
            current = self.parent(p);
        }
        out
    }

    /// Whether `ancestor` lies strictly above `id`
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    /// Child indices leading from the root to `id`
    pub fn path_indices(&self, id: NodeId) -> Option<Vec<usize>> {
        if !self.contains(id) {
            return None;
        }
        let mut path = Vec::new();
        let mut current = id;
        while current != self.root {
            path.push(self.index_in_parent(current)?);
            current = self.parent(current)?;
        }
        path.reverse();
        Some(path)
    }

    /// Document order of two positions; `None` when either node is missing
    pub fn compare_positions(&self, a: &Position, b: &Position) -> Option<Ordering> {
        let mut ka = self.path_indices(a.node_id)?;
        let mut kb = self.path_indices(b.node_id)?;
        ka.push(a.offset);
        kb.push(b.offset);
        Some(ka.cmp(&kb))
    }

    /// Concatenated text of all text nodes under `id`
    pub fn node_text_content(&self, id: NodeId) -> String {
        self.subtree(id)
            .into_iter()
            .filter_map(|n| self.get(n).and_then(Node::as_text))
            .map(|t| t.text.as_str())
            .collect()
    }

    /// Visible text of the document, one line per top-level block
    pub fn text_content(&self) -> String {
        self.children(self.root)
            .iter()
            .map(|&id| self.node_text_content(id))
            .collect::<Vec<_>>()
            .join("\n")
    }

    // =========================================================================
    // Integrity
    // =========================================================================

    /// Check the structural invariants: the root has no parent, every node is
    /// reachable exactly once, every child points back at its parent, and
    /// leaves have no children.
    pub fn validate(&self) -> Result<()> {
        let root = self.node(self.root)?;
        if root.parent().is_some() {
            return Err(DocModelError::TreeStructure("root has a parent".into()));
        }

        let mut seen = HashSet::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                return Err(DocModelError::TreeStructure(format!("node {id} is reachable twice")));
            }
            let node = self
                .get(id)
                .ok_or_else(|| DocModelError::TreeStructure(format!("dangling key {id}")))?;
            if !node.is_element() && !node.children().is_empty() {
                return Err(DocModelError::TreeStructure(format!("leaf {id} has children")));
            }
            for &child in node.children() {
                let child_node = self
                    .get(child)
                    .ok_or_else(|| DocModelError::TreeStructure(format!("dangling key {child}")))?;
                if child_node.parent() != Some(id) {
                    return Err(DocModelError::TreeStructure(format!(
                        "node {child} does not point back at {id}"
                    )));
                }
                stack.push(child);
            }
        }

        if seen.len() != self.nodes.len() {
            return Err(DocModelError::TreeStructure(format!(
                "{} orphaned nodes",
                self.nodes.len() - seen.len()
            )));
        }
        Ok(())
    }

    /// Same types, payloads and child order everywhere, ignoring keys
    pub fn same_structure(&self, other: &DocumentTree) -> bool {
        self.same_subtree(self.root, other, other.root)
    }

    fn same_subtree(&self, id: NodeId, other: &DocumentTree, other_id: NodeId) -> bool {
        match (self.get(id), other.get(other_id)) {
            (Some(a), Some(b)) => {
                a.same_content(b)
                    && a.children().len() == b.children().len()
                    && a
                        .children()
                        .iter()
                        .zip(b.children())
                        .all(|(&ca, &cb)| self.same_subtree(ca, other, cb))
            }
            _ => false,
        }
    }
}

/// Byte index of a char offset; `offset == char count` maps to the end
fn byte_index(s: &str, offset: usize) -> Option<usize> {
    s.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(s.len()))
        .nth(offset)
}
