//! Node-type registry
//!
//! Maps a `type` string to the operations every node type provides: JSON
//! export/import, render binding, and HTML mapping. New node types register
//! here; nothing else in the kernel switches on type names.

use crate::{
    DocModelError, DomConversion, DomElement, DomMatcher, DomOutput, Node, NodeBody, NodeClass,
    NodeType, RenderConfig, RenderHandle, Result,
};
use std::collections::HashMap;

/// A serialized node object (`{type, version, ...}`)
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Where a node may appear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    Root,
    Block,
    Inline,
    ListItem,
    TableRow,
    TableCell,
}

/// What children a node accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentModel {
    Blocks,
    Inlines,
    ListItems,
    TableRows,
    TableCells,
    Empty,
}

impl ContentModel {
    pub fn accepts(self, placement: Placement) -> bool {
        matches!(
            (self, placement),
            (ContentModel::Blocks, Placement::Block)
                | (ContentModel::Inlines, Placement::Inline)
                | (ContentModel::ListItems, Placement::ListItem)
                | (ContentModel::TableRows, Placement::TableRow)
                | (ContentModel::TableCells, Placement::TableCell)
        )
    }
}

/// The operation table of one node type
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub node_type: NodeType,
    pub class: NodeClass,
    /// Current JSON version; bumped whenever attributes are added
    pub version: u32,
    pub placement: Placement,
    pub content: ContentModel,
    /// Write type-specific fields; `type`, `version` and `children` are
    /// handled by the caller
    pub export_json: fn(&Node, &mut JsonMap),
    /// Rebuild the payload from an object written by any version up to the
    /// current one
    pub import_json: fn(&JsonMap, u32) -> Result<NodeBody>,
    pub bind_to_surface: fn(&Node, &RenderConfig) -> RenderHandle,
    pub export_dom: fn(&Node) -> DomOutput,
    pub import_dom: &'static [DomMatcher],
}

/// Registry of every node type known to a document
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    specs: HashMap<NodeType, NodeSpec>,
    order: Vec<NodeType>,
}

impl NodeRegistry {
    /// An empty registry (not even `root`)
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the generic rich-text vocabulary plus the
    /// citation, bibliography and image types
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for spec in crate::nodes::builtin_specs() {
            registry.insert(spec);
        }
        registry
    }

    /// Register a node type. Each type can be registered once.
    pub fn register(&mut self, spec: NodeSpec) -> Result<()> {
        if self.specs.contains_key(&spec.node_type) {
            return Err(DocModelError::DuplicateNodeType(spec.node_type.to_string()));
        }
        self.insert(spec);
        Ok(())
    }

    fn insert(&mut self, spec: NodeSpec) {
        if !self.specs.contains_key(&spec.node_type) {
            self.order.push(spec.node_type.clone());
        }
        self.specs.insert(spec.node_type.clone(), spec);
    }

    pub fn get(&self, node_type: &NodeType) -> Option<&NodeSpec> {
        self.specs.get(node_type)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&NodeSpec> {
        self.specs.get(&NodeType::new(name))
    }

    pub fn contains(&self, node_type: &NodeType) -> bool {
        self.specs.contains_key(node_type)
    }

    pub fn spec_for(&self, node: &Node) -> Result<&NodeSpec> {
        self.get(node.node_type())
            .ok_or_else(|| DocModelError::UnknownNodeType(node.node_type().to_string()))
    }

    /// Registered type names in registration order
    pub fn types(&self) -> impl Iterator<Item = &NodeType> {
        self.order.iter()
    }

    /// `{type, version, ...attributes}` for one node, without children
    pub fn export_node(&self, node: &Node) -> Result<JsonMap> {
        let spec = self.spec_for(node)?;
        let mut map = JsonMap::new();
        map.insert("type".into(), spec.node_type.as_str().into());
        map.insert("version".into(), spec.version.into());
        (spec.export_json)(node, &mut map);
        Ok(map)
    }

    pub fn bind_to_surface(&self, node: &Node, config: &RenderConfig) -> Result<RenderHandle> {
        let spec = self.spec_for(node)?;
        Ok((spec.bind_to_surface)(node, config))
    }

    pub fn export_dom(&self, node: &Node) -> Result<DomOutput> {
        let spec = self.spec_for(node)?;
        Ok((spec.export_dom)(node))
    }

    /// Convert an HTML element through the highest-priority matcher that
    /// accepts it. `None` means no type claims the element.
    pub fn convert_dom(&self, element: &DomElement) -> Option<DomConversion> {
        let mut matchers: Vec<(usize, &DomMatcher)> = self
            .order
            .iter()
            .filter_map(|ty| self.specs.get(ty))
            .flat_map(|spec| spec.import_dom.iter())
            .filter(|m| m.tag == element.tag)
            .enumerate()
            .collect();
        matchers.sort_by(|(ia, a), (ib, b)| b.priority.cmp(&a.priority).then(ia.cmp(ib)));
        matchers
            .into_iter()
            .find_map(|(_, matcher)| (matcher.convert)(element))
    }

    pub fn placement(&self, node_type: &NodeType) -> Option<Placement> {
        self.get(node_type).map(|s| s.placement)
    }

    pub fn content(&self, node_type: &NodeType) -> Option<ContentModel> {
        self.get(node_type).map(|s| s.content)
    }

    pub fn is_inline(&self, node_type: &NodeType) -> bool {
        self.placement(node_type) == Some(Placement::Inline)
    }

    /// Whether a node of `child` type may live directly under `parent`
    pub fn accepts_child(&self, parent: &NodeType, child: &NodeType) -> bool {
        match (self.content(parent), self.placement(child)) {
            (Some(content), Some(placement)) => content.accepts(placement),
            _ => false,
        }
    }

    /// Non-inline containers of inline content (paragraph, heading, list
    /// item, ...): the blocks a caret lives in
    pub fn is_text_block(&self, node_type: &NodeType) -> bool {
        self.get(node_type).is_some_and(|s| {
            s.content == ContentModel::Inlines && s.placement != Placement::Inline
        })
    }
}
