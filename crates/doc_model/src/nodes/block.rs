//! Root and generic block types: paragraph, heading, quote, horizontal rule

use super::{export_bare, export_nothing, import_plain_element, opt_str};
use crate::{
    bind_generic, ContentModel, DocModelError, DomConversion, DomElement, DomMatcher, DomOutput,
    ElementBody, JsonMap, Node, NodeBody, NodeClass, NodeSpec, NodeType, Placement, RenderConfig,
    RenderHandle, Result,
};
use serde::{Deserialize, Serialize};

/// Heading level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingTag {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingTag {
    pub fn as_str(self) -> &'static str {
        match self {
            HeadingTag::H1 => "h1",
            HeadingTag::H2 => "h2",
            HeadingTag::H3 => "h3",
            HeadingTag::H4 => "h4",
            HeadingTag::H5 => "h5",
            HeadingTag::H6 => "h6",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "h1" => Some(HeadingTag::H1),
            "h2" => Some(HeadingTag::H2),
            "h3" => Some(HeadingTag::H3),
            "h4" => Some(HeadingTag::H4),
            "h5" => Some(HeadingTag::H5),
            "h6" => Some(HeadingTag::H6),
            _ => None,
        }
    }
}

pub fn paragraph() -> Node {
    Node::element(NodeType::PARAGRAPH)
}

pub fn heading(tag: HeadingTag) -> Node {
    Node::new(
        NodeType::HEADING,
        NodeBody::Element(ElementBody::new().with_attr("tag", tag.as_str())),
    )
}

pub fn quote() -> Node {
    Node::element(NodeType::QUOTE)
}

pub fn horizontal_rule() -> Node {
    Node::element(NodeType::HORIZONTAL_RULE)
}

/// Level of a heading node; `None` for any other node
pub fn heading_tag(node: &Node) -> Option<HeadingTag> {
    if node.node_type() != &NodeType::HEADING {
        return None;
    }
    node.as_element()
        .and_then(|e| e.str_attr("tag"))
        .and_then(HeadingTag::parse)
}

pub(crate) fn root_spec() -> NodeSpec {
    NodeSpec {
        node_type: NodeType::ROOT,
        class: NodeClass::Element,
        version: 1,
        placement: Placement::Root,
        content: ContentModel::Blocks,
        export_json: export_nothing,
        import_json: import_plain_element,
        bind_to_surface: |node, config| bind_generic(node, config, "div", "root"),
        export_dom: export_bare,
        import_dom: &[],
    }
}

pub(crate) fn paragraph_spec() -> NodeSpec {
    const MATCHERS: &[DomMatcher] = &[DomMatcher {
        tag: "p",
        priority: 0,
        convert: |_| Some(DomConversion::Node(paragraph())),
    }];

    NodeSpec {
        node_type: NodeType::PARAGRAPH,
        class: NodeClass::Element,
        version: 1,
        placement: Placement::Block,
        content: ContentModel::Inlines,
        export_json: export_nothing,
        import_json: import_plain_element,
        bind_to_surface: |node, config| bind_generic(node, config, "p", "paragraph"),
        export_dom: |_| DomOutput::element(DomElement::new("p")),
        import_dom: MATCHERS,
    }
}

fn export_heading(node: &Node, map: &mut JsonMap) {
    let tag = heading_tag(node).unwrap_or(HeadingTag::H1);
    map.insert("tag".into(), tag.as_str().into());
}

fn import_heading(map: &JsonMap, _version: u32) -> Result<NodeBody> {
    let raw = opt_str(map, "tag", "heading")?
        .ok_or_else(|| DocModelError::invalid_attributes("heading", "missing `tag`"))?;
    let tag = HeadingTag::parse(raw)
        .ok_or_else(|| DocModelError::invalid_attributes("heading", format!("unknown tag `{raw}`")))?;
    Ok(NodeBody::Element(ElementBody::new().with_attr("tag", tag.as_str())))
}

fn bind_heading(node: &Node, config: &RenderConfig) -> RenderHandle {
    let tag = heading_tag(node).unwrap_or(HeadingTag::H1).as_str();
    bind_generic(node, config, tag, &format!("heading.{tag}"))
}

fn export_heading_dom(node: &Node) -> DomOutput {
    let tag = heading_tag(node).unwrap_or(HeadingTag::H1);
    DomOutput::element(DomElement::new(tag.as_str()))
}

fn convert_heading(element: &DomElement) -> Option<DomConversion> {
    HeadingTag::parse(&element.tag).map(|tag| DomConversion::Node(heading(tag)))
}

pub(crate) fn heading_spec() -> NodeSpec {
    const fn matcher(tag: &'static str) -> DomMatcher {
        DomMatcher {
            tag,
            priority: 0,
            convert: convert_heading,
        }
    }
    const MATCHERS: &[DomMatcher] = &[
        matcher("h1"),
        matcher("h2"),
        matcher("h3"),
        matcher("h4"),
        matcher("h5"),
        matcher("h6"),
    ];

    NodeSpec {
        node_type: NodeType::HEADING,
        class: NodeClass::Element,
        version: 1,
        placement: Placement::Block,
        content: ContentModel::Inlines,
        export_json: export_heading,
        import_json: import_heading,
        bind_to_surface: bind_heading,
        export_dom: export_heading_dom,
        import_dom: MATCHERS,
    }
}

pub(crate) fn quote_spec() -> NodeSpec {
    const MATCHERS: &[DomMatcher] = &[DomMatcher {
        tag: "blockquote",
        priority: 0,
        convert: |_| Some(DomConversion::Node(quote())),
    }];

    NodeSpec {
        node_type: NodeType::QUOTE,
        class: NodeClass::Element,
        version: 1,
        placement: Placement::Block,
        content: ContentModel::Inlines,
        export_json: export_nothing,
        import_json: import_plain_element,
        bind_to_surface: |node, config| bind_generic(node, config, "blockquote", "quote"),
        export_dom: |_| DomOutput::element(DomElement::new("blockquote")),
        import_dom: MATCHERS,
    }
}

pub(crate) fn horizontal_rule_spec() -> NodeSpec {
    const MATCHERS: &[DomMatcher] = &[DomMatcher {
        tag: "hr",
        priority: 0,
        convert: |_| Some(DomConversion::Node(horizontal_rule())),
    }];

    NodeSpec {
        node_type: NodeType::HORIZONTAL_RULE,
        class: NodeClass::Element,
        version: 1,
        placement: Placement::Block,
        content: ContentModel::Empty,
        export_json: export_nothing,
        import_json: import_plain_element,
        bind_to_surface: |node, config| bind_generic(node, config, "hr", "horizontalrule"),
        export_dom: |_| DomOutput::void(DomElement::new("hr")),
        import_dom: MATCHERS,
    }
}
