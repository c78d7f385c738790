//! Import outcome shared by the JSON and HTML readers
//!
//! Imports never fail on content: anything that cannot be represented is
//! degraded and reported here instead.

use doc_model::DocumentTree;

/// Something that was degraded or guessed during an import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportWarning {
    pub kind: WarningKind,
    pub message: String,
}

impl ImportWarning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Types of import warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    /// No registered type has this name; a placeholder stands in
    UnknownNodeType,
    /// The type is known but its fields could not be read
    InvalidAttributes,
    /// Written by a newer version than this reader knows; read best-effort
    NewerVersion,
    /// A node appeared where its parent cannot hold it
    MisplacedNode,
    /// The HTML parser stopped early; content up to that point was kept
    MalformedHtml,
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningKind::UnknownNodeType => write!(f, "Unknown node type"),
            WarningKind::InvalidAttributes => write!(f, "Invalid attributes"),
            WarningKind::NewerVersion => write!(f, "Newer version"),
            WarningKind::MisplacedNode => write!(f, "Misplaced node"),
            WarningKind::MalformedHtml => write!(f, "Malformed HTML"),
        }
    }
}

impl std::fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Result of importing a whole document
#[derive(Debug)]
pub struct ImportResult {
    /// The imported document tree
    pub tree: DocumentTree,
    /// Warnings encountered during import
    pub warnings: Vec<ImportWarning>,
}

impl ImportResult {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn warnings_of_kind(&self, kind: WarningKind) -> Vec<&ImportWarning> {
        self.warnings.iter().filter(|w| w.kind == kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_of_kind() {
        let result = ImportResult {
            tree: DocumentTree::new(),
            warnings: vec![
                ImportWarning::new(WarningKind::UnknownNodeType, "widget"),
                ImportWarning::new(WarningKind::NewerVersion, "image v9"),
                ImportWarning::new(WarningKind::UnknownNodeType, "gadget"),
            ],
        };
        assert!(result.has_warnings());
        assert_eq!(result.warning_count(), 3);
        assert_eq!(result.warnings_of_kind(WarningKind::UnknownNodeType).len(), 2);
        assert_eq!(
            result.warnings[1].to_string(),
            "Newer version: image v9"
        );
    }
}
