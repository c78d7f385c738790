//! Document files on disk (JSON form)

use crate::{ImportResult, Result, StoreError};
use doc_model::{DocumentTree, NodeRegistry};
use std::path::Path;

/// Save a document as JSON
pub fn save_document(tree: &DocumentTree, registry: &NodeRegistry, path: impl AsRef<Path>) -> Result<()> {
    let json = crate::export_json_string(tree, registry)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load a document saved with [`save_document`]
pub fn load_document(path: impl AsRef<Path>, registry: &NodeRegistry) -> Result<ImportResult> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(StoreError::FileNotFound(path.display().to_string()));
    }

    let json = std::fs::read_to_string(path)?;
    crate::import_json_str(&json, registry)
}
