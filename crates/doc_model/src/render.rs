//! Render-surface binding
//!
//! The kernel does not draw anything. Binding a node produces a
//! `RenderHandle` describing what the host surface should show for it.

use crate::{Attributes, Node, NodeBody, TextFormat};
use std::collections::HashMap;

/// Theme class names keyed by role (`"paragraph"`, `"heading.h1"`,
/// `"text.bold"`, `"citation"`, ...)
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub theme: HashMap<String, String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let theme = [
            ("paragraph", "editor-paragraph"),
            ("quote", "editor-quote"),
            ("heading.h1", "editor-heading-h1"),
            ("heading.h2", "editor-heading-h2"),
            ("heading.h3", "editor-heading-h3"),
            ("list.bullet", "editor-list-ul"),
            ("list.number", "editor-list-ol"),
            ("listitem", "editor-listitem"),
            ("table", "editor-table"),
            ("tablecell", "editor-table-cell"),
            ("tablecell.header", "editor-table-cell-header"),
            ("mark", "editor-mark"),
            ("citation", "citation"),
            ("bibliography", "bibliography-entry"),
            ("text.bold", "editor-text-bold"),
            ("text.italic", "editor-text-italic"),
            ("text.underline", "editor-text-underline"),
            ("text.strikethrough", "editor-text-strikethrough"),
            ("text.code", "editor-text-code"),
            ("text.subscript", "editor-text-subscript"),
            ("text.superscript", "editor-text-superscript"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self { theme }
    }
}

impl RenderConfig {
    pub fn class_for(&self, role: &str) -> Option<&str> {
        self.theme.get(role).map(String::as_str)
    }

    /// Theme classes for the format flags of a text node
    pub fn format_classes(&self, format: TextFormat) -> Vec<String> {
        const ROLES: [(TextFormat, &str); 7] = [
            (TextFormat::BOLD, "text.bold"),
            (TextFormat::ITALIC, "text.italic"),
            (TextFormat::UNDERLINE, "text.underline"),
            (TextFormat::STRIKETHROUGH, "text.strikethrough"),
            (TextFormat::CODE, "text.code"),
            (TextFormat::SUBSCRIPT, "text.subscript"),
            (TextFormat::SUPERSCRIPT, "text.superscript"),
        ];
        ROLES
            .iter()
            .filter(|(flag, _)| format.contains(*flag))
            .filter_map(|(_, role)| self.class_for(role))
            .map(str::to_string)
            .collect()
    }
}

/// Visual representation of one node handed to the host surface
#[derive(Debug, Clone, PartialEq)]
pub enum RenderHandle {
    Text {
        text: String,
        classes: Vec<String>,
        atomic: bool,
    },
    Element {
        tag: String,
        classes: Vec<String>,
    },
    /// Drawn by the host renderer registered under `renderer`
    Decorator {
        renderer: String,
        props: Attributes,
    },
}

/// Generic binding derived from node type and formatting.
///
/// `tag` is the element tag (ignored for text and decorator nodes) and
/// `role` the theme key for the node itself.
pub fn bind_generic(node: &Node, config: &RenderConfig, tag: &str, role: &str) -> RenderHandle {
    match node.body() {
        NodeBody::Text(t) => {
            let mut classes: Vec<String> = config.class_for(role).map(str::to_string).into_iter().collect();
            classes.extend(config.format_classes(t.format));
            RenderHandle::Text {
                text: t.text.clone(),
                classes,
                atomic: t.is_atomic(),
            }
        }
        NodeBody::Element(_) => RenderHandle::Element {
            tag: tag.to_string(),
            classes: config.class_for(role).map(str::to_string).into_iter().collect(),
        },
        NodeBody::Decorator(d) => RenderHandle::Decorator {
            renderer: node.node_type().to_string(),
            props: d.props().clone(),
        },
    }
}
