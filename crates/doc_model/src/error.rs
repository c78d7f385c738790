//! Error types for document model operations

use crate::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocModelError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("Node type already registered: {0}")]
    DuplicateNodeType(String),

    #[error("Atomic node {0} can only be removed as a whole")]
    AtomicNode(NodeId),

    #[error("Node {0} is immutable; re-create it to change its fields")]
    ImmutableNode(NodeId),

    #[error("Invalid offset {offset} in node {node_id}")]
    InvalidOffset { node_id: NodeId, offset: usize },

    #[error("Invalid attributes for {node_type}: {reason}")]
    InvalidAttributes { node_type: String, reason: String },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Tree structure error: {0}")]
    TreeStructure(String),
}

impl DocModelError {
    /// Shorthand for attribute validation failures during import
    pub fn invalid_attributes(node_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAttributes {
            node_type: node_type.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DocModelError>;
