//! Editor configuration
//!
//! Every field has a default, so a partial JSON file only overrides what it
//! names.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration of one editor instance
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    pub history: HistoryConfig,
    pub citation: CitationConfig,
    pub image: ImageConfig,
    pub table: TableConfig,
}

/// Undo history settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of undo steps kept
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_entries: 100 }
    }
}

/// Text used when a citation is inserted without author or year
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CitationConfig {
    pub fallback_author: String,
    pub fallback_year: String,
}

impl Default for CitationConfig {
    fn default() -> Self {
        Self {
            fallback_author: "Anonim".to_string(),
            fallback_year: "n.d.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImageConfig {
    /// Width cap in pixels for images inserted without one
    pub default_max_width: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            default_max_width: doc_model::nodes::DEFAULT_MAX_WIDTH,
        }
    }
}

/// Upper bounds for `InsertTable`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TableConfig {
    pub max_rows: usize,
    pub max_columns: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            max_rows: 500,
            max_columns: 64,
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file.
    ///
    /// A missing file yields defaults. So does a file that does not parse,
    /// with a warning; only I/O failures are errors.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no editor config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        match Self::from_json_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse editor config {}, using defaults: {}",
                    path.display(),
                    e
                );
                Ok(Self::default())
            }
        }
    }
}
