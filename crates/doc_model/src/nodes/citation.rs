//! Inline citation markers
//!
//! A citation is a text node in atomic mode whose payload is the fully
//! rendered marker, e.g. `(Smith, 2020)`. Author and year are resolved by
//! whoever inserts it; the node itself keeps no bibliographic fields.

use super::text::{export_text_fields, import_text_fields};
use crate::{
    bind_generic, ContentModel, DomElement, DomOutput, JsonMap, Node, NodeBody, NodeClass,
    NodeSpec, NodeType, Placement, Result, TextBody, TextMode,
};

/// Create a detached citation holding pre-formatted `display_text`
pub fn create_citation(display_text: impl Into<String>) -> Node {
    Node::new(
        NodeType::CITATION,
        NodeBody::Text(TextBody::new(display_text).with_mode(TextMode::Atomic)),
    )
}

pub fn is_citation(node: &Node) -> bool {
    node.node_type() == &NodeType::CITATION
}

fn import_citation(map: &JsonMap, _version: u32) -> Result<NodeBody> {
    let body = import_text_fields(map, "citation")?;
    Ok(NodeBody::Text(body.with_mode(TextMode::Atomic)))
}

fn export_citation_dom(_node: &Node) -> DomOutput {
    DomOutput::element(DomElement::new("span").with_attr("class", "citation"))
}

pub(crate) fn citation_spec() -> NodeSpec {
    NodeSpec {
        node_type: NodeType::CITATION,
        class: NodeClass::Text,
        version: 1,
        placement: Placement::Inline,
        content: ContentModel::Empty,
        export_json: export_text_fields,
        import_json: import_citation,
        bind_to_surface: |node, config| bind_generic(node, config, "span", "citation"),
        export_dom: export_citation_dom,
        // No import matcher: `span.citation` comes back as plain text.
        import_dom: &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RenderConfig, RenderHandle};

    #[test]
    fn test_citation_is_atomic() {
        let c = create_citation("(Smith, 2020)");
        assert!(c.is_atomic());
        assert!(is_citation(&c));
        assert_eq!(c.as_text().map(|t| t.text.as_str()), Some("(Smith, 2020)"));
    }

    #[test]
    fn test_import_forces_atomic_mode() {
        let mut map = JsonMap::new();
        map.insert("text".into(), "(Doe, 1999)".into());
        map.insert("mode".into(), "normal".into());
        match import_citation(&map, 1).unwrap() {
            NodeBody::Text(t) => assert!(t.is_atomic()),
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_binding_uses_citation_class() {
        let handle = bind_generic(&create_citation("(A, 1)"), &RenderConfig::default(), "span", "citation");
        match handle {
            RenderHandle::Text { classes, atomic, .. } => {
                assert!(atomic);
                assert_eq!(classes, vec!["citation".to_string()]);
            }
            other => panic!("unexpected handle {other:?}"),
        }
    }
}
