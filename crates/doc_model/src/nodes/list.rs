//! Bullet and numbered lists

use super::{opt_str, opt_u64};
use crate::{
    bind_generic, ContentModel, DocModelError, DomConversion, DomElement, DomMatcher, DomOutput,
    ElementBody, JsonMap, Node, NodeBody, NodeClass, NodeSpec, NodeType, Placement, RenderConfig,
    RenderHandle, Result,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    Bullet,
    Number,
}

impl ListType {
    pub fn as_str(self) -> &'static str {
        match self {
            ListType::Bullet => "bullet",
            ListType::Number => "number",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bullet" => Some(ListType::Bullet),
            "number" => Some(ListType::Number),
            _ => None,
        }
    }

    pub fn html_tag(self) -> &'static str {
        match self {
            ListType::Bullet => "ul",
            ListType::Number => "ol",
        }
    }
}

pub fn create_list(list_type: ListType) -> Node {
    Node::new(
        NodeType::LIST,
        NodeBody::Element(
            ElementBody::new()
                .with_attr("listType", list_type.as_str())
                .with_attr("start", 1),
        ),
    )
}

pub fn create_list_item() -> Node {
    Node::element(NodeType::LIST_ITEM)
}

pub fn list_type(node: &Node) -> Option<ListType> {
    if node.node_type() != &NodeType::LIST {
        return None;
    }
    node.as_element()
        .and_then(|e| e.str_attr("listType"))
        .and_then(ListType::parse)
}

fn export_list(node: &Node, map: &mut JsonMap) {
    let kind = list_type(node).unwrap_or(ListType::Bullet);
    let start = node.as_element().and_then(|e| e.u64_attr("start")).unwrap_or(1);
    map.insert("listType".into(), kind.as_str().into());
    map.insert("start".into(), start.into());
}

fn import_list(map: &JsonMap, _version: u32) -> Result<NodeBody> {
    let raw = opt_str(map, "listType", "list")?.unwrap_or("bullet");
    let kind = ListType::parse(raw)
        .ok_or_else(|| DocModelError::invalid_attributes("list", format!("unknown listType `{raw}`")))?;
    let start = opt_u64(map, "start", "list")?.unwrap_or(1);
    Ok(NodeBody::Element(
        ElementBody::new()
            .with_attr("listType", kind.as_str())
            .with_attr("start", start),
    ))
}

fn bind_list(node: &Node, config: &RenderConfig) -> RenderHandle {
    let kind = list_type(node).unwrap_or(ListType::Bullet);
    bind_generic(node, config, kind.html_tag(), &format!("list.{}", kind.as_str()))
}

fn export_list_dom(node: &Node) -> DomOutput {
    let kind = list_type(node).unwrap_or(ListType::Bullet);
    let mut element = DomElement::new(kind.html_tag());
    let start = node.as_element().and_then(|e| e.u64_attr("start")).unwrap_or(1);
    if kind == ListType::Number && start != 1 {
        element = element.with_attr("start", start.to_string());
    }
    DomOutput::element(element)
}

fn convert_list(element: &DomElement) -> Option<DomConversion> {
    let kind = match element.tag.as_str() {
        "ol" => ListType::Number,
        _ => ListType::Bullet,
    };
    let start = element
        .attr("start")
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(1);
    Some(DomConversion::Node(Node::new(
        NodeType::LIST,
        NodeBody::Element(
            ElementBody::new()
                .with_attr("listType", kind.as_str())
                .with_attr("start", start),
        ),
    )))
}

const LIST_MATCHERS: &[DomMatcher] = &[
    DomMatcher {
        tag: "ul",
        priority: 0,
        convert: convert_list,
    },
    DomMatcher {
        tag: "ol",
        priority: 0,
        convert: convert_list,
    },
];

const ITEM_MATCHERS: &[DomMatcher] = &[DomMatcher {
    tag: "li",
    priority: 0,
    convert: |_| Some(DomConversion::Node(create_list_item())),
}];

pub(crate) fn list_spec() -> NodeSpec {
    NodeSpec {
        node_type: NodeType::LIST,
        class: NodeClass::Element,
        version: 2,
        placement: Placement::Block,
        content: ContentModel::ListItems,
        export_json: export_list,
        import_json: import_list,
        bind_to_surface: bind_list,
        export_dom: export_list_dom,
        import_dom: LIST_MATCHERS,
    }
}

pub(crate) fn list_item_spec() -> NodeSpec {
    NodeSpec {
        node_type: NodeType::LIST_ITEM,
        class: NodeClass::Element,
        version: 1,
        placement: Placement::ListItem,
        content: ContentModel::Inlines,
        export_json: super::export_nothing,
        import_json: super::import_plain_element,
        bind_to_surface: |node, config| bind_generic(node, config, "li", "listitem"),
        export_dom: |_| DomOutput::element(DomElement::new("li")),
        import_dom: ITEM_MATCHERS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_start_defaults_to_one() {
        let mut map = JsonMap::new();
        map.insert("listType".into(), "number".into());
        let NodeBody::Element(e) = import_list(&map, 1).unwrap() else {
            panic!("expected element");
        };
        assert_eq!(e.u64_attr("start"), Some(1));
        assert_eq!(e.str_attr("listType"), Some("number"));
    }

    #[test]
    fn test_ol_start_attribute() {
        let el = DomElement::new("ol").with_attr("start", "3");
        let Some(DomConversion::Node(node)) = convert_list(&el) else {
            panic!("expected node");
        };
        assert_eq!(list_type(&node), Some(ListType::Number));
        assert_eq!(export_list_dom(&node).element.unwrap().attr("start"), Some("3"));
    }
}
