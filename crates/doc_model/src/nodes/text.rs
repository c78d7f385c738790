//! Plain text nodes and the inline format tags that map onto them

use super::opt_str;
use crate::{
    bind_generic, ContentModel, DocModelError, DomConversion, DomElement, DomMatcher, DomOutput,
    JsonMap, Node, NodeBody, NodeClass, NodeSpec, NodeType, Placement, Result, TextBody,
    TextFormat, TextMode,
};

/// A detached text node with the given format
pub fn formatted_text(text: impl Into<String>, format: TextFormat) -> Node {
    Node::new(
        NodeType::TEXT,
        NodeBody::Text(TextBody::new(text).with_format(format)),
    )
}

/// HTML tag for each format flag, in nesting order (outermost first)
pub const FORMAT_TAGS: [(TextFormat, &str); 7] = [
    (TextFormat::BOLD, "strong"),
    (TextFormat::ITALIC, "em"),
    (TextFormat::UNDERLINE, "u"),
    (TextFormat::STRIKETHROUGH, "s"),
    (TextFormat::CODE, "code"),
    (TextFormat::SUBSCRIPT, "sub"),
    (TextFormat::SUPERSCRIPT, "sup"),
];

pub(crate) fn export_text_fields(node: &Node, map: &mut JsonMap) {
    if let Some(t) = node.as_text() {
        map.insert("text".into(), t.text.clone().into());
        map.insert("format".into(), t.format.bits().into());
        map.insert("mode".into(), t.mode.as_str().into());
    }
}

/// Shared by every text-class type. Fields added after the first release
/// default when absent.
pub(crate) fn import_text_fields(map: &JsonMap, node_type: &str) -> Result<TextBody> {
    let text = opt_str(map, "text", node_type)?.unwrap_or_default();

    let format = match map.get("format") {
        None | Some(serde_json::Value::Null) => TextFormat::empty(),
        Some(v) => {
            let bits = v.as_u64().ok_or_else(|| {
                DocModelError::invalid_attributes(node_type, format!("`format` must be an integer, got {v}"))
            })?;
            TextFormat::from_bits_truncate(bits as u32)
        }
    };

    let mode = match opt_str(map, "mode", node_type)? {
        None => TextMode::Normal,
        // Older documents used the substrate's names for indivisible text.
        Some("token") | Some("segmented") => TextMode::Atomic,
        Some(raw) => TextMode::parse(raw).ok_or_else(|| {
            DocModelError::invalid_attributes(node_type, format!("unknown mode `{raw}`"))
        })?,
    };

    Ok(TextBody::new(text).with_format(format).with_mode(mode))
}

fn import_text(map: &JsonMap, _version: u32) -> Result<NodeBody> {
    import_text_fields(map, "text").map(NodeBody::Text)
}

const fn format_matcher(tag: &'static str, convert: fn(&DomElement) -> Option<DomConversion>) -> DomMatcher {
    DomMatcher {
        tag,
        priority: 0,
        convert,
    }
}

fn bold(_: &DomElement) -> Option<DomConversion> {
    Some(DomConversion::Format(TextFormat::BOLD))
}

fn italic(_: &DomElement) -> Option<DomConversion> {
    Some(DomConversion::Format(TextFormat::ITALIC))
}

fn underline(_: &DomElement) -> Option<DomConversion> {
    Some(DomConversion::Format(TextFormat::UNDERLINE))
}

fn strikethrough(_: &DomElement) -> Option<DomConversion> {
    Some(DomConversion::Format(TextFormat::STRIKETHROUGH))
}

fn code(_: &DomElement) -> Option<DomConversion> {
    Some(DomConversion::Format(TextFormat::CODE))
}

fn subscript(_: &DomElement) -> Option<DomConversion> {
    Some(DomConversion::Format(TextFormat::SUBSCRIPT))
}

fn superscript(_: &DomElement) -> Option<DomConversion> {
    Some(DomConversion::Format(TextFormat::SUPERSCRIPT))
}

const FORMAT_MATCHERS: &[DomMatcher] = &[
    format_matcher("strong", bold),
    format_matcher("b", bold),
    format_matcher("em", italic),
    format_matcher("i", italic),
    format_matcher("u", underline),
    format_matcher("s", strikethrough),
    format_matcher("strike", strikethrough),
    format_matcher("del", strikethrough),
    format_matcher("code", code),
    format_matcher("sub", subscript),
    format_matcher("sup", superscript),
];

pub(crate) fn text_spec() -> NodeSpec {
    NodeSpec {
        node_type: NodeType::TEXT,
        class: NodeClass::Text,
        version: 1,
        placement: Placement::Inline,
        content: ContentModel::Empty,
        export_json: export_text_fields,
        import_json: import_text,
        bind_to_surface: |node, config| bind_generic(node, config, "span", "text"),
        export_dom: |_| DomOutput::bare(),
        import_dom: FORMAT_MATCHERS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: serde_json::Value) -> JsonMap {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_missing_fields_default() {
        let body = import_text_fields(&object(json!({"text": "Hi"})), "text").unwrap();
        assert_eq!(body.text, "Hi");
        assert!(body.format.is_empty());
        assert_eq!(body.mode, TextMode::Normal);
    }

    #[test]
    fn test_legacy_mode_names_are_atomic() {
        let body = import_text_fields(&object(json!({"text": "x", "mode": "token"})), "text").unwrap();
        assert!(body.is_atomic());
    }

    #[test]
    fn test_bad_format_is_rejected() {
        let result = import_text_fields(&object(json!({"text": "x", "format": "bold"})), "text");
        assert!(matches!(result, Err(DocModelError::InvalidAttributes { .. })));
    }

    #[test]
    fn test_export_fields() {
        let node = formatted_text("Hi", TextFormat::BOLD | TextFormat::ITALIC);
        let mut map = JsonMap::new();
        export_text_fields(&node, &mut map);
        assert_eq!(map["format"], json!(3));
        assert_eq!(map["mode"], json!("normal"));
    }
}
