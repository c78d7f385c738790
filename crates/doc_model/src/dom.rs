//! Per-type HTML mapping hooks
//!
//! The HTML reader and writer live in the store crate; node types describe
//! here how they map to and from HTML elements so that a newly registered
//! type participates in interchange without touching either side.

use crate::{Node, TextFormat};

/// A parsed HTML element as seen by import matchers (children excluded)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomElement {
    /// Lower-cased tag name
    pub tag: String,
    /// Attributes in source order, names lower-cased, values entity-decoded
    pub attributes: Vec<(String, String)>,
}

impl DomElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
}

/// How a node renders as HTML
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomOutput {
    /// Wrapping element; `None` emits the node's content bare
    pub element: Option<DomElement>,
    /// Void elements have no content and no end tag
    pub void: bool,
}

impl DomOutput {
    pub fn element(element: DomElement) -> Self {
        Self {
            element: Some(element),
            void: false,
        }
    }

    pub fn void(element: DomElement) -> Self {
        Self {
            element: Some(element),
            void: true,
        }
    }

    pub fn bare() -> Self {
        Self {
            element: None,
            void: false,
        }
    }
}

/// What an HTML element becomes on import
#[derive(Debug, Clone)]
pub enum DomConversion {
    /// Create this node; the element's children convert into it
    Node(Node),
    /// Descendant text gains these format flags
    Format(TextFormat),
    /// Drop the element together with its subtree
    Skip,
}

/// Import hook for one tag name
#[derive(Debug, Clone, Copy)]
pub struct DomMatcher {
    pub tag: &'static str,
    /// Higher priorities are tried first when several types claim a tag
    pub priority: u8,
    pub convert: fn(&DomElement) -> Option<DomConversion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_class_matches_whole_words() {
        let el = DomElement::new("p").with_attr("class", "bibliography-entry hanging");
        assert!(el.has_class("bibliography-entry"));
        assert!(el.has_class("hanging"));
        assert!(!el.has_class("bibliography"));
    }
}
