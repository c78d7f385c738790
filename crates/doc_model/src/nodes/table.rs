//! Tables, rows and cells

use super::{export_nothing, import_plain_element};
use crate::{
    bind_generic, ContentModel, DocModelError, DomConversion, DomElement, DomMatcher, DomOutput,
    ElementBody, JsonMap, Node, NodeBody, NodeClass, NodeSpec, NodeType, Placement, RenderConfig,
    RenderHandle, Result,
};

pub fn create_table() -> Node {
    Node::element(NodeType::TABLE)
}

pub fn create_table_row() -> Node {
    Node::element(NodeType::TABLE_ROW)
}

pub fn create_table_cell(header: bool) -> Node {
    Node::new(
        NodeType::TABLE_CELL,
        NodeBody::Element(ElementBody::new().with_attr("header", header)),
    )
}

pub fn is_header_cell(node: &Node) -> bool {
    node.node_type() == &NodeType::TABLE_CELL
        && node.as_element().and_then(|e| e.bool_attr("header")).unwrap_or(false)
}

fn export_cell(node: &Node, map: &mut JsonMap) {
    map.insert("header".into(), is_header_cell(node).into());
}

fn import_cell(map: &JsonMap, _version: u32) -> Result<NodeBody> {
    let header = match map.get("header") {
        None | Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::Bool(b)) => *b,
        Some(other) => {
            return Err(DocModelError::invalid_attributes(
                "tablecell",
                format!("`header` must be a boolean, got {other}"),
            ))
        }
    };
    Ok(NodeBody::Element(ElementBody::new().with_attr("header", header)))
}

fn bind_cell(node: &Node, config: &RenderConfig) -> RenderHandle {
    if is_header_cell(node) {
        bind_generic(node, config, "th", "tablecell.header")
    } else {
        bind_generic(node, config, "td", "tablecell")
    }
}

fn export_cell_dom(node: &Node) -> DomOutput {
    DomOutput::element(DomElement::new(if is_header_cell(node) { "th" } else { "td" }))
}

fn convert_cell(element: &DomElement) -> Option<DomConversion> {
    Some(DomConversion::Node(create_table_cell(element.tag == "th")))
}

const TABLE_MATCHERS: &[DomMatcher] = &[DomMatcher {
    tag: "table",
    priority: 0,
    convert: |_| Some(DomConversion::Node(create_table())),
}];

const ROW_MATCHERS: &[DomMatcher] = &[DomMatcher {
    tag: "tr",
    priority: 0,
    convert: |_| Some(DomConversion::Node(create_table_row())),
}];

const CELL_MATCHERS: &[DomMatcher] = &[
    DomMatcher {
        tag: "td",
        priority: 0,
        convert: convert_cell,
    },
    DomMatcher {
        tag: "th",
        priority: 0,
        convert: convert_cell,
    },
];

pub(crate) fn table_spec() -> NodeSpec {
    NodeSpec {
        node_type: NodeType::TABLE,
        class: NodeClass::Element,
        version: 1,
        placement: Placement::Block,
        content: ContentModel::TableRows,
        export_json: export_nothing,
        import_json: import_plain_element,
        bind_to_surface: |node, config| bind_generic(node, config, "table", "table"),
        export_dom: |_| DomOutput::element(DomElement::new("table")),
        import_dom: TABLE_MATCHERS,
    }
}

pub(crate) fn table_row_spec() -> NodeSpec {
    NodeSpec {
        node_type: NodeType::TABLE_ROW,
        class: NodeClass::Element,
        version: 1,
        placement: Placement::TableRow,
        content: ContentModel::TableCells,
        export_json: export_nothing,
        import_json: import_plain_element,
        bind_to_surface: |node, config| bind_generic(node, config, "tr", "tablerow"),
        export_dom: |_| DomOutput::element(DomElement::new("tr")),
        import_dom: ROW_MATCHERS,
    }
}

pub(crate) fn table_cell_spec() -> NodeSpec {
    NodeSpec {
        node_type: NodeType::TABLE_CELL,
        class: NodeClass::Element,
        version: 1,
        placement: Placement::TableCell,
        content: ContentModel::Blocks,
        export_json: export_cell,
        import_json: import_cell,
        bind_to_surface: bind_cell,
        export_dom: export_cell_dom,
        import_dom: CELL_MATCHERS,
    }
}
