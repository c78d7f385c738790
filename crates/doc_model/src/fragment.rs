//! Detached node trees used to move content into a document

use crate::{Node, NodeBody, NodeType, TextBody};

/// An owned, nested node that is not part of any document yet.
///
/// Fragments carry no keys: grafting one into a tree mints fresh keys.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentNode {
    pub node_type: NodeType,
    pub body: NodeBody,
    pub children: Vec<FragmentNode>,
}

impl FragmentNode {
    pub fn new(node_type: NodeType, body: NodeBody) -> Self {
        Self {
            node_type,
            body,
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(NodeType::TEXT, NodeBody::Text(TextBody::new(text)))
    }

    /// Copy the type and payload of an arena node (children not included)
    pub fn from_node(node: &Node) -> Self {
        Self::new(node.node_type().clone(), node.body().clone())
    }

    pub fn with_children(mut self, children: Vec<FragmentNode>) -> Self {
        self.children = children;
        self
    }

    pub fn push(&mut self, child: FragmentNode) {
        self.children.push(child);
    }

    /// Materialize this node (without children) as a detached arena node
    pub fn to_node(&self) -> Node {
        Node::new(self.node_type.clone(), self.body.clone())
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let NodeBody::Text(t) = &self.body {
            out.push_str(&t.text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }
}

/// An ordered list of detached sibling nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub nodes: Vec<FragmentNode>,
}

impl Fragment {
    pub fn new(nodes: Vec<FragmentNode>) -> Self {
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FragmentNode> {
        self.nodes.iter()
    }

    pub fn text_content(&self) -> String {
        self.nodes.iter().map(FragmentNode::text_content).collect()
    }
}

impl IntoIterator for Fragment {
    type Item = FragmentNode;
    type IntoIter = std::vec::IntoIter<FragmentNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}
