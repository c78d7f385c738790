//! Core node types: identity, type tags, and per-class bodies

use crate::{TextFormat, TextMode};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque per-instance key of a node.
///
/// Keys are random UUIDs minted on construction, never derived from content,
/// so a key is never handed out twice, not even after the node is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Type tag of a node, as written to the `type` field of its JSON form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeType(Cow<'static, str>);

impl NodeType {
    pub const ROOT: NodeType = NodeType::from_static("root");
    pub const PARAGRAPH: NodeType = NodeType::from_static("paragraph");
    pub const HEADING: NodeType = NodeType::from_static("heading");
    pub const QUOTE: NodeType = NodeType::from_static("quote");
    pub const LIST: NodeType = NodeType::from_static("list");
    pub const LIST_ITEM: NodeType = NodeType::from_static("listitem");
    pub const HORIZONTAL_RULE: NodeType = NodeType::from_static("horizontalrule");
    pub const TABLE: NodeType = NodeType::from_static("table");
    pub const TABLE_ROW: NodeType = NodeType::from_static("tablerow");
    pub const TABLE_CELL: NodeType = NodeType::from_static("tablecell");
    pub const MARK: NodeType = NodeType::from_static("mark");
    pub const TEXT: NodeType = NodeType::from_static("text");
    pub const CITATION: NodeType = NodeType::from_static("citation");
    pub const BIBLIOGRAPHY: NodeType = NodeType::from_static("bibliography");
    pub const IMAGE: NodeType = NodeType::from_static("image");

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for NodeType {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeType {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// The three node shapes every type is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeClass {
    /// Leaf holding a string payload and formatting
    Text,
    /// Container holding an ordered list of children
    Element,
    /// Leaf rendered by an external renderer
    Decorator,
}

/// Free-form attribute map of element and decorator nodes
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Payload of a text node
#[derive(Debug, Clone, PartialEq)]
pub struct TextBody {
    pub text: String,
    pub format: TextFormat,
    pub mode: TextMode,
}

impl TextBody {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::empty(),
            mode: TextMode::Normal,
        }
    }

    pub fn with_format(mut self, format: TextFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_mode(mut self, mode: TextMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn is_atomic(&self) -> bool {
        self.mode == TextMode::Atomic
    }

    /// Length in chars; all text offsets in the model are char offsets
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Payload of an element node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementBody {
    attrs: Attributes,
}

impl ElementBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    pub fn attr(&self, key: &str) -> Option<&serde_json::Value> {
        self.attrs.get(key)
    }

    pub fn str_attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(|v| v.as_str())
    }

    pub fn u64_attr(&self, key: &str) -> Option<u64> {
        self.attrs.get(key).and_then(|v| v.as_u64())
    }

    pub fn bool_attr(&self, key: &str) -> Option<bool> {
        self.attrs.get(key).and_then(|v| v.as_bool())
    }

    pub(crate) fn set_attr(&mut self, key: &str, value: serde_json::Value) {
        self.attrs.insert(key.to_string(), value);
    }
}

/// Payload of a decorator node. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoratorBody {
    props: Attributes,
}

impl DecoratorBody {
    pub fn new(props: Attributes) -> Self {
        Self { props }
    }

    pub fn props(&self) -> &Attributes {
        &self.props
    }

    pub fn prop(&self, key: &str) -> Option<&serde_json::Value> {
        self.props.get(key)
    }

    pub fn str_prop(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(|v| v.as_str())
    }
}

/// Class-specific payload of a node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeBody {
    Text(TextBody),
    Element(ElementBody),
    Decorator(DecoratorBody),
}

impl NodeBody {
    pub fn class(&self) -> NodeClass {
        match self {
            NodeBody::Text(_) => NodeClass::Text,
            NodeBody::Element(_) => NodeClass::Element,
            NodeBody::Decorator(_) => NodeClass::Decorator,
        }
    }
}

/// A node stored in the document arena.
///
/// The parent is a key lookup, never an owning reference; children are owned
/// by exactly one parent and move on re-parenting. The type tag is fixed at
/// construction.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    node_type: NodeType,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    body: NodeBody,
}

impl Node {
    /// Create a detached node with a fresh key
    pub fn new(node_type: NodeType, body: NodeBody) -> Self {
        Self {
            id: NodeId::new(),
            node_type,
            parent: None,
            children: Vec::new(),
            body,
        }
    }

    /// Create a detached editable text node
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(NodeType::TEXT, NodeBody::Text(TextBody::new(text)))
    }

    /// Create a detached element node without attributes
    pub fn element(node_type: NodeType) -> Self {
        Self::new(node_type, NodeBody::Element(ElementBody::new()))
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node_type(&self) -> &NodeType {
        &self.node_type
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn body(&self) -> &NodeBody {
        &self.body
    }

    pub fn class(&self) -> NodeClass {
        self.body.class()
    }

    pub fn as_text(&self) -> Option<&TextBody> {
        match &self.body {
            NodeBody::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&ElementBody> {
        match &self.body {
            NodeBody::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_decorator(&self) -> Option<&DecoratorBody> {
        match &self.body {
            NodeBody::Decorator(d) => Some(d),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.body, NodeBody::Text(_))
    }

    pub fn is_element(&self) -> bool {
        matches!(self.body, NodeBody::Element(_))
    }

    pub fn is_decorator(&self) -> bool {
        matches!(self.body, NodeBody::Decorator(_))
    }

    pub fn is_atomic(&self) -> bool {
        self.as_text().is_some_and(TextBody::is_atomic)
    }

    /// A detached copy with a new key and no children
    pub fn fresh_copy(&self) -> Node {
        Node::new(self.node_type.clone(), self.body.clone())
    }

    /// True when type and payload match, ignoring keys and links
    pub fn same_content(&self, other: &Node) -> bool {
        self.node_type == other.node_type && self.body == other.body
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.children
    }

    pub(crate) fn text_mut(&mut self) -> Option<&mut TextBody> {
        match &mut self.body {
            NodeBody::Text(t) => Some(t),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self) -> Option<&mut ElementBody> {
        match &mut self.body {
            NodeBody::Element(e) => Some(e),
            _ => None,
        }
    }
}
