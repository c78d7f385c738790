//! Built-in node types
//!
//! Each module owns one family of types: its constructors, typed views and
//! the `NodeSpec` it contributes to the registry.

mod bibliography;
mod block;
mod citation;
mod image;
mod list;
mod mark;
mod table;
mod text;

pub use bibliography::*;
pub use block::*;
pub use citation::*;
pub use image::*;
pub use list::*;
pub use mark::*;
pub use table::*;
pub use text::*;

use crate::{
    DocModelError, DomOutput, ElementBody, FragmentNode, JsonMap, Node, NodeBody, NodeSpec,
    NodeType, Result,
};

/// Every built-in spec, in registration order
pub fn builtin_specs() -> Vec<NodeSpec> {
    vec![
        block::root_spec(),
        block::paragraph_spec(),
        block::heading_spec(),
        block::quote_spec(),
        block::horizontal_rule_spec(),
        list::list_spec(),
        list::list_item_spec(),
        table::table_spec(),
        table::table_row_spec(),
        table::table_cell_spec(),
        mark::mark_spec(),
        text::text_spec(),
        citation::citation_spec(),
        bibliography::bibliography_spec(),
        image::image_spec(),
    ]
}

/// Stand-in for a subtree whose type could not be imported, in block context
pub fn placeholder_block(recovered_text: &str) -> FragmentNode {
    let para = FragmentNode::new(NodeType::PARAGRAPH, NodeBody::Element(ElementBody::new()));
    if recovered_text.is_empty() {
        para
    } else {
        para.with_children(vec![FragmentNode::text(recovered_text)])
    }
}

/// Stand-in for an unimportable subtree in inline context
pub fn placeholder_inline(recovered_text: &str) -> FragmentNode {
    FragmentNode::text(recovered_text)
}

// Shared hooks for types without attributes.

pub(crate) fn export_nothing(_node: &Node, _map: &mut JsonMap) {}

pub(crate) fn import_plain_element(_map: &JsonMap, _version: u32) -> Result<NodeBody> {
    Ok(NodeBody::Element(ElementBody::new()))
}

pub(crate) fn export_bare(_node: &Node) -> DomOutput {
    DomOutput::bare()
}

/// Read a string field, failing when it is present with the wrong type
pub(crate) fn opt_str<'a>(map: &'a JsonMap, key: &str, node_type: &str) -> Result<Option<&'a str>> {
    match map.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(DocModelError::invalid_attributes(
            node_type,
            format!("`{key}` must be a string, got {other}"),
        )),
    }
}

pub(crate) fn opt_u64(map: &JsonMap, key: &str, node_type: &str) -> Result<Option<u64>> {
    match map.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => v.as_u64().map(Some).ok_or_else(|| {
            DocModelError::invalid_attributes(node_type, format!("`{key}` must be a non-negative integer, got {v}"))
        }),
    }
}
