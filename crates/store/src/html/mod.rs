//! HTML interchange
//!
//! The writer covers every registered type through its DOM export hook.
//! The reader accepts arbitrary, possibly malformed HTML and never fails;
//! it is lossy for node semantics plain HTML cannot carry (a citation comes
//! back as ordinary text). Use the JSON form when fidelity matters.

mod convert;
mod reader;
mod writer;

pub use writer::{export_html, export_node_html};

use crate::{ImportResult, ImportWarning, Result};
use convert::Converter;
use doc_model::nodes::paragraph;
use doc_model::{DocumentTree, DomElement, Fragment, FragmentNode, NodeRegistry, Placement};

/// Style the writer puts on text blocks whose spacing must survive
pub(crate) const PRE_WRAP: &str = "white-space: pre-wrap";

/// Whether an element's inline style keeps spaces and line breaks as written
pub(crate) fn keeps_whitespace(element: &DomElement) -> bool {
    element.attr("style").is_some_and(|style| {
        style.split(';').any(|decl| match decl.split_once(':') {
            Some((name, value)) => {
                name.trim().eq_ignore_ascii_case("white-space")
                    && matches!(
                        value.trim().to_ascii_lowercase().as_str(),
                        "pre" | "pre-wrap" | "break-spaces"
                    )
            }
            None => false,
        })
    })
}

/// Nodes parsed from an HTML snippet, ready to be inserted into a document
#[derive(Debug, Clone, Default)]
pub struct HtmlImport {
    /// Either only inline nodes or only blocks
    pub fragment: Fragment,
    pub warnings: Vec<ImportWarning>,
}

impl HtmlImport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Parse an HTML snippet (pasted content, a chunk of streamed output)
pub fn parse_html(html: &str, registry: &NodeRegistry) -> HtmlImport {
    let mut warnings = Vec::new();
    let dom = reader::parse_dom(html, &mut warnings);
    let fragment = Converter::new(registry).convert_document(&dom);
    tracing::trace!(nodes = fragment.len(), "parsed HTML fragment");
    HtmlImport { fragment, warnings }
}

/// Build a whole document from HTML; inline-only content is wrapped in a
/// paragraph
pub fn import_html(html: &str, registry: &NodeRegistry) -> Result<ImportResult> {
    let HtmlImport { fragment, warnings } = parse_html(html, registry);
    let inline = fragment
        .iter()
        .any(|n| registry.placement(&n.node_type) == Some(Placement::Inline));
    let blocks = if inline {
        vec![FragmentNode::from_node(&paragraph()).with_children(fragment.nodes)]
    } else {
        fragment.nodes
    };

    let mut tree = DocumentTree::new();
    let root = tree.root_id();
    tree.graft_all(&blocks, root, None)?;
    tracing::debug!(nodes = tree.len(), warnings = warnings.len(), "imported HTML document");
    Ok(ImportResult { tree, warnings })
}
