//! Tree to HTML
//!
//! Output is compact (no whitespace between elements) so that reading it
//! back does not invent text nodes. A text block whose spacing HTML would
//! collapse carries `white-space: pre-wrap`.

use super::PRE_WRAP;
use crate::Result;
use doc_model::nodes::FORMAT_TAGS;
use doc_model::{
    ContentModel, DocumentTree, DomElement, Node, NodeBody, NodeId, NodeRegistry, Placement,
};
use quick_xml::escape::{escape, partial_escape};

/// Serialize the whole document
pub fn export_html(tree: &DocumentTree, registry: &NodeRegistry) -> Result<String> {
    let mut writer = HtmlWriter::new(tree, registry);
    writer.write_node(tree.root_id())?;
    Ok(writer.finish())
}

/// Serialize one node and its subtree
pub fn export_node_html(tree: &DocumentTree, registry: &NodeRegistry, id: NodeId) -> Result<String> {
    let mut writer = HtmlWriter::new(tree, registry);
    writer.write_node(id)?;
    Ok(writer.finish())
}

struct HtmlWriter<'a> {
    tree: &'a DocumentTree,
    registry: &'a NodeRegistry,
    out: String,
}

impl<'a> HtmlWriter<'a> {
    fn new(tree: &'a DocumentTree, registry: &'a NodeRegistry) -> Self {
        Self {
            tree,
            registry,
            out: String::new(),
        }
    }

    fn finish(self) -> String {
        self.out
    }

    fn write_node(&mut self, id: NodeId) -> Result<()> {
        let tree = self.tree;
        let node = tree.node(id)?;
        let dom = self.registry.export_dom(node)?;
        if let Some(element) = &dom.element {
            if self.keeps_spacing(node) {
                self.open_tag(&with_pre_wrap(element));
            } else {
                self.open_tag(element);
            }
            if dom.void {
                return Ok(());
            }
        }

        match node.body() {
            NodeBody::Text(text) => {
                let tags: Vec<&str> = FORMAT_TAGS
                    .iter()
                    .filter(|(flag, _)| text.format.contains(*flag))
                    .map(|(_, tag)| *tag)
                    .collect();
                for tag in &tags {
                    self.out.push('<');
                    self.out.push_str(tag);
                    self.out.push('>');
                }
                self.out.push_str(&partial_escape(text.text.as_str()));
                for tag in tags.iter().rev() {
                    self.close_tag(tag);
                }
            }
            NodeBody::Element(_) => {
                for &child in node.children() {
                    self.write_node(child)?;
                }
            }
            NodeBody::Decorator(_) => {}
        }

        if let Some(element) = &dom.element {
            self.close_tag(&element.tag);
        }
        Ok(())
    }

    /// Whether `node` is a text block whose spaces a reader would collapse
    fn keeps_spacing(&self, node: &Node) -> bool {
        let node_type = node.node_type();
        if self.registry.content(node_type) != Some(ContentModel::Inlines)
            || self.registry.placement(node_type) == Some(Placement::Inline)
        {
            return false;
        }
        let mut text = String::new();
        self.inline_text(node.id(), &mut text);
        has_significant_whitespace(&text)
    }

    /// Text of the inline content under `id`; other leaves stand in as U+FFFC
    fn inline_text(&self, id: NodeId, out: &mut String) {
        for &child in self.tree.children(id) {
            match self.tree.get(child).map(Node::body) {
                Some(NodeBody::Text(text)) => out.push_str(&text.text),
                Some(NodeBody::Element(_)) => self.inline_text(child, out),
                _ => out.push('\u{FFFC}'),
            }
        }
    }

    fn open_tag(&mut self, element: &DomElement) {
        self.out.push('<');
        self.out.push_str(&element.tag);
        for (name, value) in &element.attributes {
            self.out.push(' ');
            self.out.push_str(name);
            self.out.push_str("=\"");
            self.out.push_str(&escape(value.as_str()));
            self.out.push('"');
        }
        self.out.push('>');
    }

    fn close_tag(&mut self, tag: &str) {
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
    }
}

fn has_significant_whitespace(text: &str) -> bool {
    text.starts_with(' ')
        || text.ends_with(' ')
        || text.contains("  ")
        || text.contains(['\t', '\n', '\r', '\u{0C}'])
}

fn with_pre_wrap(element: &DomElement) -> DomElement {
    let mut element = element.clone();
    match element.attributes.iter_mut().find(|(name, _)| name == "style") {
        Some((_, style)) => {
            let kept = style.trim_end().trim_end_matches(';').len();
            style.truncate(kept);
            style.push_str("; ");
            style.push_str(PRE_WRAP);
        }
        None => element.attributes.push(("style".into(), PRE_WRAP.into())),
    }
    element
}
