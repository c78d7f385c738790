//! Embedded images, drawn by the host's own renderer

use super::{opt_str, opt_u64};
use crate::{
    bind_generic, Attributes, ContentModel, DecoratorBody, DocModelError, DomConversion,
    DomElement, DomMatcher, DomOutput, JsonMap, Node, NodeBody, NodeClass, NodeSpec, NodeType,
    Placement, Result,
};
use serde::{Deserialize, Serialize};

/// Width cap applied when none is given; also the value documents written
/// before `maxWidth` existed are read with
pub const DEFAULT_MAX_WIDTH: u32 = 500;

/// Fields of an image node.
///
/// `source` is not checked for reachability; a broken link is the render
/// surface's problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProps {
    #[serde(rename = "src")]
    pub source: String,
    #[serde(default)]
    pub alt_text: String,
    #[serde(default = "default_max_width")]
    pub max_width: u32,
}

fn default_max_width() -> u32 {
    DEFAULT_MAX_WIDTH
}

impl ImageProps {
    pub fn new(source: impl Into<String>, alt_text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            alt_text: alt_text.into(),
            max_width: DEFAULT_MAX_WIDTH,
        }
    }

    pub fn with_max_width(mut self, max_width: u32) -> Self {
        self.max_width = max_width;
        self
    }

    /// Read the fields back from an image node
    pub fn from_node(node: &Node) -> Option<Self> {
        if node.node_type() != &NodeType::IMAGE {
            return None;
        }
        let d = node.as_decorator()?;
        Some(Self {
            source: d.str_prop("src").unwrap_or_default().to_string(),
            alt_text: d.str_prop("altText").unwrap_or_default().to_string(),
            max_width: d
                .prop("maxWidth")
                .and_then(|v| v.as_u64())
                .and_then(|w| u32::try_from(w).ok())
                .unwrap_or(DEFAULT_MAX_WIDTH),
        })
    }

    fn to_props(&self) -> Attributes {
        let mut props = Attributes::new();
        props.insert("src".into(), self.source.clone().into());
        props.insert("altText".into(), self.alt_text.clone().into());
        props.insert("maxWidth".into(), self.max_width.into());
        props
    }
}

/// Create a detached image node. Its fields cannot change afterwards.
pub fn create_image(props: &ImageProps) -> Node {
    Node::new(NodeType::IMAGE, NodeBody::Decorator(DecoratorBody::new(props.to_props())))
}

fn export_image(node: &Node, map: &mut JsonMap) {
    if let Some(props) = ImageProps::from_node(node) {
        map.extend(props.to_props());
    }
}

fn import_image(map: &JsonMap, version: u32) -> Result<NodeBody> {
    let source = opt_str(map, "src", "image")?
        .ok_or_else(|| DocModelError::invalid_attributes("image", "missing `src`"))?;
    let alt_text = opt_str(map, "altText", "image")?.unwrap_or_default();
    // Version 1 had no width cap.
    let max_width = match version {
        0 | 1 => None,
        _ => opt_u64(map, "maxWidth", "image")?,
    }
    .map(|w| {
        u32::try_from(w)
            .map_err(|_| DocModelError::invalid_attributes("image", format!("`maxWidth` {w} out of range")))
    })
    .transpose()?
    .unwrap_or(DEFAULT_MAX_WIDTH);

    let props = ImageProps::new(source, alt_text).with_max_width(max_width);
    Ok(NodeBody::Decorator(DecoratorBody::new(props.to_props())))
}

fn export_image_dom(node: &Node) -> DomOutput {
    let props = ImageProps::from_node(node).unwrap_or_else(|| ImageProps::new("", ""));
    DomOutput::void(
        DomElement::new("img")
            .with_attr("src", props.source)
            .with_attr("alt", props.alt_text)
            .with_attr("style", format!("max-width: {}px;", props.max_width)),
    )
}

/// Pull `max-width: Npx` out of an inline style attribute
pub(crate) fn parse_max_width(style: &str) -> Option<u32> {
    style.split(';').find_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        if !name.trim().eq_ignore_ascii_case("max-width") {
            return None;
        }
        let value = value.trim();
        let digits = value.strip_suffix("px").unwrap_or(value).trim();
        digits.parse().ok()
    })
}

fn convert_img(element: &DomElement) -> Option<DomConversion> {
    let source = element.attr("src").map(str::trim).unwrap_or_default();
    if source.is_empty() {
        return Some(DomConversion::Skip);
    }
    let max_width = element
        .attr("style")
        .and_then(parse_max_width)
        .unwrap_or(DEFAULT_MAX_WIDTH);
    let props = ImageProps::new(source, element.attr("alt").unwrap_or_default()).with_max_width(max_width);
    Some(DomConversion::Node(create_image(&props)))
}

const MATCHERS: &[DomMatcher] = &[DomMatcher {
    tag: "img",
    priority: 0,
    convert: convert_img,
}];

pub(crate) fn image_spec() -> NodeSpec {
    NodeSpec {
        node_type: NodeType::IMAGE,
        class: NodeClass::Decorator,
        version: 2,
        placement: Placement::Inline,
        content: ContentModel::Empty,
        export_json: export_image,
        import_json: import_image,
        bind_to_surface: |node, config| bind_generic(node, config, "img", "image"),
        export_dom: export_image_dom,
        import_dom: MATCHERS,
    }
}
