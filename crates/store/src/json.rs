//! Versioned JSON form of a document
//!
//! Every node is written as `{type, version, ...fields}` with a `children`
//! array on element nodes; the document itself is the `root` node. This is
//! the lossless channel: `import_json(export_json(d))` rebuilds `d`.

use crate::{ImportResult, ImportWarning, Result, StoreError, WarningKind};
use doc_model::nodes::{
    create_list_item, create_table_cell, create_table_row, placeholder_block, placeholder_inline,
};
use doc_model::{
    ContentModel, DocumentTree, FragmentNode, JsonMap, NodeId, NodeRegistry, NodeType,
};
use serde_json::Value;

/// Export the whole document as a JSON value
pub fn export_json(tree: &DocumentTree, registry: &NodeRegistry) -> Result<Value> {
    export_subtree(tree, registry, tree.root_id()).map(Value::Object)
}

/// Export the whole document as pretty-printed JSON text
pub fn export_json_string(tree: &DocumentTree, registry: &NodeRegistry) -> Result<String> {
    let value = export_json(tree, registry)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

fn export_subtree(tree: &DocumentTree, registry: &NodeRegistry, id: NodeId) -> Result<JsonMap> {
    let node = tree.node(id)?;
    let mut map = registry.export_node(node)?;
    if node.is_element() {
        let children = node
            .children()
            .iter()
            .map(|&child| export_subtree(tree, registry, child).map(Value::Object))
            .collect::<Result<Vec<_>>>()?;
        map.insert("children".into(), Value::Array(children));
    }
    Ok(map)
}

/// Rebuild a document from its JSON value.
///
/// Only a missing or non-`root` top level is an error; unknown types,
/// unreadable fields and misplaced nodes degrade to placeholders and are
/// reported as warnings.
pub fn import_json(value: &Value, registry: &NodeRegistry) -> Result<ImportResult> {
    let root = value
        .as_object()
        .ok_or_else(|| StoreError::InvalidFormat("document must be a JSON object".into()))?;
    match root.get("type").and_then(Value::as_str) {
        Some("root") => {}
        Some(other) => {
            return Err(StoreError::InvalidFormat(format!(
                "top-level node must be `root`, got `{other}`"
            )))
        }
        None => return Err(StoreError::InvalidFormat("top-level node has no `type`".into())),
    }

    let mut importer = JsonImporter::new(registry);
    importer.check_version(root, &NodeType::ROOT);
    let children = importer.import_children(root, &NodeType::ROOT);

    let mut tree = DocumentTree::new();
    let root_id = tree.root_id();
    tree.graft_all(&children, root_id, None)?;
    tracing::debug!(
        nodes = tree.len(),
        warnings = importer.warnings.len(),
        "imported JSON document"
    );
    Ok(ImportResult {
        tree,
        warnings: importer.warnings,
    })
}

/// Parse JSON text and import it
pub fn import_json_str(json: &str, registry: &NodeRegistry) -> Result<ImportResult> {
    let value: Value = serde_json::from_str(json)?;
    import_json(&value, registry)
}

/// Import one serialized node as it would appear under a `parent_type`
/// node, for callers that splice JSON content into an existing document.
/// `None` means the parent cannot hold anything.
pub fn import_node_json(
    value: &Value,
    parent_type: &NodeType,
    registry: &NodeRegistry,
) -> (Option<FragmentNode>, Vec<ImportWarning>) {
    let mut importer = JsonImporter::new(registry);
    let node = importer.import_node(value, parent_type);
    (node, importer.warnings)
}

struct JsonImporter<'a> {
    registry: &'a NodeRegistry,
    warnings: Vec<ImportWarning>,
}

impl<'a> JsonImporter<'a> {
    fn new(registry: &'a NodeRegistry) -> Self {
        Self {
            registry,
            warnings: Vec::new(),
        }
    }

    fn warn(&mut self, kind: WarningKind, message: String) {
        tracing::warn!(%kind, "{message}");
        self.warnings.push(ImportWarning::new(kind, message));
    }

    /// Version written with the node; absent means the first version
    fn check_version(&mut self, map: &JsonMap, node_type: &NodeType) -> u32 {
        let version = map
            .get("version")
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(1);
        let current = self.registry.get(node_type).map(|s| s.version).unwrap_or(1);
        if version > current {
            self.warn(
                WarningKind::NewerVersion,
                format!("{node_type} v{version} is newer than supported v{current}"),
            );
        }
        version
    }

    fn import_children(&mut self, map: &JsonMap, parent_type: &NodeType) -> Vec<FragmentNode> {
        let children = match map.get("children") {
            None | Some(Value::Null) => return Vec::new(),
            Some(Value::Array(children)) => children,
            Some(other) => {
                self.warn(
                    WarningKind::InvalidAttributes,
                    format!("`children` of {parent_type} must be an array, got {other}"),
                );
                return Vec::new();
            }
        };
        children
            .iter()
            .filter_map(|child| self.import_node(child, parent_type))
            .collect()
    }

    fn import_node(&mut self, value: &Value, parent_type: &NodeType) -> Option<FragmentNode> {
        let Some(map) = value.as_object() else {
            self.warn(
                WarningKind::InvalidAttributes,
                format!("expected a node object under {parent_type}, got {value}"),
            );
            return self.placeholder(parent_type, "");
        };
        let Some(type_name) = map.get("type").and_then(Value::as_str) else {
            self.warn(
                WarningKind::InvalidAttributes,
                format!("node under {parent_type} has no `type`"),
            );
            return self.placeholder(parent_type, &recovered_text(value, "unknown"));
        };

        let registry = self.registry;
        let Some(spec) = registry.get_by_name(type_name) else {
            self.warn(
                WarningKind::UnknownNodeType,
                format!("`{type_name}` is not registered; replaced with a placeholder"),
            );
            return self.placeholder(parent_type, &recovered_text(value, type_name));
        };

        if !registry.accepts_child(parent_type, &spec.node_type) {
            self.warn(
                WarningKind::MisplacedNode,
                format!("{type_name} cannot appear inside {parent_type}"),
            );
            return self.placeholder(parent_type, &recovered_text(value, type_name));
        }

        let version = self.check_version(map, &spec.node_type);
        let body = match (spec.import_json)(map, version) {
            Ok(body) => body,
            Err(e) => {
                self.warn(WarningKind::InvalidAttributes, e.to_string());
                return self.placeholder(parent_type, &recovered_text(value, type_name));
            }
        };

        let mut node = FragmentNode::new(spec.node_type.clone(), body);
        if spec.content != ContentModel::Empty {
            node.children = self.import_children(map, &spec.node_type);
        }
        Some(node)
    }

    /// Stand-in that fits wherever the parent's content model allows
    fn placeholder(&self, parent_type: &NodeType, text: &str) -> Option<FragmentNode> {
        let node = match self.registry.content(parent_type)? {
            ContentModel::Inlines => placeholder_inline(text),
            ContentModel::Blocks => placeholder_block(text),
            ContentModel::ListItems => FragmentNode::from_node(&create_list_item())
                .with_children(vec![placeholder_inline(text)]),
            ContentModel::TableCells => table_cell_placeholder(text),
            ContentModel::TableRows => FragmentNode::from_node(&create_table_row())
                .with_children(vec![table_cell_placeholder(text)]),
            ContentModel::Empty => return None,
        };
        Some(node)
    }
}

fn table_cell_placeholder(text: &str) -> FragmentNode {
    FragmentNode::from_node(&create_table_cell(false)).with_children(vec![placeholder_block(text)])
}

/// All `text` fields of a subtree in document order, or `[type]` when the
/// subtree holds no text
fn recovered_text(value: &Value, type_name: &str) -> String {
    fn collect(value: &Value, out: &mut String) {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(text)) = map.get("text") {
                    out.push_str(text);
                }
                if let Some(Value::Array(children)) = map.get("children") {
                    for child in children {
                        collect(child, out);
                    }
                }
            }
            Value::Array(items) => items.iter().for_each(|v| collect(v, out)),
            _ => {}
        }
    }

    let mut out = String::new();
    collect(value, &mut out);
    if out.is_empty() {
        format!("[{type_name}]")
    } else {
        out
    }
}
