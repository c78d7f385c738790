//! The editor facade

use crate::Result;
use doc_model::{DocumentTree, Selection};
use edit_engine::{
    DocumentUpdate, EditingEngine, EditorCommand, EditorConfig, ListenerId,
};
use serde_json::Value;
use std::path::Path;
use store::ImportWarning;

/// The only surface external content producers are given
pub trait EditorBridge {
    /// Parse `html` and insert the result at the current selection.
    /// Content that cannot be inserted is dropped with a warning.
    fn insert_content(&mut self, html: &str);

    /// The whole document as HTML, taken at call time
    fn get_html(&self) -> String;
}

/// What an initial-load call did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The document was replaced; anything degraded on the way is listed
    Loaded { warnings: Vec<ImportWarning> },
    /// A load already happened or the user has started editing
    Skipped,
}

/// One open document with its command bus and history
pub struct Editor {
    engine: EditingEngine,
    loaded: bool,
}

impl Editor {
    /// An editor holding one empty paragraph
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            engine: EditingEngine::with_config(config),
            loaded: false,
        }
    }

    /// Read the configuration from a JSON file; a missing file means
    /// defaults
    pub fn with_config_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_config(EditorConfig::load(path)?))
    }

    pub fn engine(&self) -> &EditingEngine {
        &self.engine
    }

    /// Direct access for hosts that register their own handlers or node
    /// types
    pub fn engine_mut(&mut self) -> &mut EditingEngine {
        &mut self.engine
    }

    pub fn tree(&self) -> &DocumentTree {
        self.engine.tree()
    }

    pub fn selection(&self) -> Selection {
        self.engine.selection()
    }

    pub fn set_selection(&mut self, selection: Selection) -> Result<()> {
        Ok(self.engine.set_selection(selection)?)
    }

    /// Dispatch a command by name with a camelCase JSON payload. Returns
    /// whether a handler consumed it; unknown names and bad payloads are
    /// logged and report false.
    pub fn dispatch(&mut self, command_type: &str, payload: Value) -> bool {
        match EditorCommand::from_parts(command_type, payload) {
            Ok(command) => self.engine.dispatch(&command),
            Err(e) => {
                tracing::warn!(command = command_type, error = %e, "rejected command");
                false
            }
        }
    }

    pub fn undo(&mut self) -> bool {
        self.engine.undo().is_ok()
    }

    pub fn redo(&mut self) -> bool {
        self.engine.redo().is_ok()
    }

    pub fn add_update_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&DocumentUpdate<'_>) + 'static,
    {
        self.engine.add_update_listener(listener)
    }

    pub fn remove_update_listener(&mut self, id: ListenerId) -> bool {
        self.engine.remove_update_listener(id)
    }

    /// Replace the document with stored HTML.
    ///
    /// Runs at most once per editor, and never after the first edit, so a
    /// host that re-renders and calls it again cannot clobber user work.
    pub fn load_initial_html(&mut self, html: &str) -> Result<LoadOutcome> {
        if !self.can_load() {
            return Ok(LoadOutcome::Skipped);
        }
        let result = store::import_html(html, self.engine.registry())?;
        self.finish_load(result)
    }

    /// Replace the document with its stored JSON form; same once-only rule
    /// as [`Editor::load_initial_html`]
    pub fn load_initial_json(&mut self, value: &Value) -> Result<LoadOutcome> {
        if !self.can_load() {
            return Ok(LoadOutcome::Skipped);
        }
        let result = store::import_json(value, self.engine.registry())?;
        self.finish_load(result)
    }

    fn can_load(&self) -> bool {
        if self.loaded || self.engine.has_edits() {
            tracing::debug!(
                loaded = self.loaded,
                edited = self.engine.has_edits(),
                "initial load skipped"
            );
            return false;
        }
        true
    }

    fn finish_load(&mut self, result: store::ImportResult) -> Result<LoadOutcome> {
        for warning in &result.warnings {
            tracing::warn!(%warning, "degraded during initial load");
        }
        self.engine.replace_document(result.tree)?;
        self.loaded = true;
        Ok(LoadOutcome::Loaded {
            warnings: result.warnings,
        })
    }

    /// The lossless JSON form, for saving
    pub fn to_json(&self) -> Result<Value> {
        Ok(store::export_json(self.engine.tree(), self.engine.registry())?)
    }

    /// Like [`EditorBridge::insert_content`], reporting whether anything
    /// was inserted and why not
    pub fn try_insert_content(&mut self, html: &str) -> Result<bool> {
        let import = store::parse_html(html, self.engine.registry());
        for warning in &import.warnings {
            tracing::warn!(%warning, "degraded while absorbing HTML");
        }
        if import.fragment.is_empty() {
            return Ok(false);
        }
        let fragment = import.fragment;
        self.engine.update("insertContent", |tx| {
            tx.insert_fragment(&fragment)?;
            Ok(())
        })?;
        Ok(true)
    }

    pub fn try_get_html(&self) -> Result<String> {
        Ok(store::export_html(self.engine.tree(), self.engine.registry())?)
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorBridge for Editor {
    fn insert_content(&mut self, html: &str) {
        if let Err(e) = self.try_insert_content(html) {
            tracing::warn!(error = %e, "insertContent failed, document unchanged");
        }
    }

    fn get_html(&self) -> String {
        self.try_get_html().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "getHtml failed");
            String::new()
        })
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("engine", &self.engine)
            .field("loaded", &self.loaded)
            .finish()
    }
}
