//! Review-comment markers wrapping a run of inline content

use super::opt_str;
use crate::{
    bind_generic, ContentModel, DocModelError, DomConversion, DomElement, DomMatcher, DomOutput,
    ElementBody, JsonMap, Node, NodeBody, NodeClass, NodeSpec, NodeType, Placement, Result,
};
use chrono::{DateTime, Utc};

pub const REVIEW_COMMENT_CLASS: &str = "review-comment";

/// The comment carried by a marker node
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewComment {
    pub comment_id: String,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl ReviewComment {
    pub fn new(comment_id: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            comment_id: comment_id.into(),
            comment: comment.into(),
            created_at: Utc::now(),
        }
    }

    pub fn from_node(node: &Node) -> Option<Self> {
        if node.node_type() != &NodeType::MARK {
            return None;
        }
        let e = node.as_element()?;
        Some(Self {
            comment_id: e.str_attr("commentId")?.to_string(),
            comment: e.str_attr("comment").unwrap_or_default().to_string(),
            created_at: e
                .str_attr("createdAt")
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or_default(),
        })
    }

    fn body(&self) -> ElementBody {
        ElementBody::new()
            .with_attr("commentId", self.comment_id.as_str())
            .with_attr("comment", self.comment.as_str())
            .with_attr("createdAt", self.created_at.to_rfc3339())
    }
}

/// Create a detached marker; the caller moves the covered inline nodes in
pub fn create_review_mark(comment: &ReviewComment) -> Node {
    Node::new(NodeType::MARK, NodeBody::Element(comment.body()))
}

fn export_mark(node: &Node, map: &mut JsonMap) {
    if let Some(e) = node.as_element() {
        for key in ["commentId", "comment", "createdAt"] {
            if let Some(v) = e.attr(key) {
                map.insert(key.into(), v.clone());
            }
        }
    }
}

fn import_mark(map: &JsonMap, _version: u32) -> Result<NodeBody> {
    let comment_id = opt_str(map, "commentId", "mark")?
        .ok_or_else(|| DocModelError::invalid_attributes("mark", "missing `commentId`"))?;
    let comment = opt_str(map, "comment", "mark")?.unwrap_or_default();
    let created_at = match opt_str(map, "createdAt", "mark")? {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map_err(|e| DocModelError::invalid_attributes("mark", format!("bad `createdAt`: {e}")))?
            .with_timezone(&Utc),
        None => DateTime::<Utc>::default(),
    };
    let comment = ReviewComment {
        comment_id: comment_id.to_string(),
        comment: comment.to_string(),
        created_at,
    };
    Ok(NodeBody::Element(comment.body()))
}

fn export_mark_dom(node: &Node) -> DomOutput {
    let mut element = DomElement::new("mark").with_attr("class", REVIEW_COMMENT_CLASS);
    if let Some(c) = ReviewComment::from_node(node) {
        element = element
            .with_attr("data-comment-id", c.comment_id)
            .with_attr("data-comment", c.comment);
    }
    DomOutput::element(element)
}

fn convert_mark(element: &DomElement) -> Option<DomConversion> {
    if !element.has_class(REVIEW_COMMENT_CLASS) {
        return None;
    }
    let id = element.attr("data-comment-id")?;
    let comment = ReviewComment::new(id, element.attr("data-comment").unwrap_or_default());
    Some(DomConversion::Node(create_review_mark(&comment)))
}

const MATCHERS: &[DomMatcher] = &[DomMatcher {
    tag: "mark",
    priority: 0,
    convert: convert_mark,
}];

pub(crate) fn mark_spec() -> NodeSpec {
    NodeSpec {
        node_type: NodeType::MARK,
        class: NodeClass::Element,
        version: 1,
        placement: Placement::Inline,
        content: ContentModel::Inlines,
        export_json: export_mark,
        import_json: import_mark,
        bind_to_surface: |node, config| bind_generic(node, config, "mark", "mark"),
        export_dom: export_mark_dom,
        import_dom: MATCHERS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_carries_comment() {
        let comment = ReviewComment::new("c1", "Needs a source");
        let node = create_review_mark(&comment);
        let back = ReviewComment::from_node(&node).unwrap();
        assert_eq!(back.comment_id, "c1");
        assert_eq!(back.comment, "Needs a source");
        // rfc3339 keeps sub-second precision
        assert_eq!(back.created_at, comment.created_at);
    }

    #[test]
    fn test_plain_mark_tag_is_not_claimed() {
        assert!(convert_mark(&DomElement::new("mark")).is_none());
    }

    #[test]
    fn test_import_requires_comment_id() {
        assert!(import_mark(&JsonMap::new(), 1).is_err());
    }
}
