//! Bibliography entries: hanging-indent paragraphs with no metadata of
//! their own

use super::{export_nothing, import_plain_element};
use crate::{
    bind_generic, ContentModel, DomConversion, DomElement, DomMatcher, DomOutput, Node, NodeClass,
    NodeSpec, NodeType, Placement,
};

pub const BIBLIOGRAPHY_CLASS: &str = "bibliography-entry";

/// Create an empty bibliography entry; the caller appends its content
pub fn create_bibliography() -> Node {
    Node::element(NodeType::BIBLIOGRAPHY)
}

fn convert_entry(element: &DomElement) -> Option<DomConversion> {
    element
        .has_class(BIBLIOGRAPHY_CLASS)
        .then(|| DomConversion::Node(create_bibliography()))
}

const MATCHERS: &[DomMatcher] = &[DomMatcher {
    tag: "p",
    priority: 1,
    convert: convert_entry,
}];

pub(crate) fn bibliography_spec() -> NodeSpec {
    NodeSpec {
        node_type: NodeType::BIBLIOGRAPHY,
        class: NodeClass::Element,
        version: 1,
        placement: Placement::Block,
        content: ContentModel::Inlines,
        export_json: export_nothing,
        import_json: import_plain_element,
        bind_to_surface: |node, config| bind_generic(node, config, "p", "bibliography"),
        export_dom: |_| DomOutput::element(DomElement::new("p").with_attr("class", BIBLIOGRAPHY_CLASS)),
        import_dom: MATCHERS,
    }
}
