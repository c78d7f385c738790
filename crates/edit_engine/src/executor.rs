//! Command execution engine

use crate::bus::{CommandBus, CommandPriority, HandlerId};
use crate::history::{History, Snapshot};
use crate::{handlers, normalize, position, CommandKind, EditError, EditorCommand, EditorConfig, Result, Transaction};
use doc_model::{DocumentTree, NodeRegistry, Selection};

/// What produced a document update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOrigin {
    Command(CommandKind),
    /// A direct `update` call, with its label
    Update(String),
    Undo,
    Redo,
    /// The whole document was replaced (initial load)
    Load,
}

/// State handed to update listeners after every commit
#[derive(Debug)]
pub struct DocumentUpdate<'a> {
    pub tree: &'a DocumentTree,
    pub selection: Selection,
    pub revision: u64,
    pub origin: UpdateOrigin,
}

pub type UpdateListener = Box<dyn FnMut(&DocumentUpdate<'_>)>;

/// Handle returned by `add_update_listener`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// The main editing engine that manages document state and command execution
pub struct EditingEngine {
    /// Current document tree
    tree: DocumentTree,
    /// Current selection
    selection: Selection,
    registry: NodeRegistry,
    config: EditorConfig,
    bus: CommandBus,
    history: History,
    listeners: Vec<(ListenerId, UpdateListener)>,
    next_listener: u64,
    /// Bumped on every committed change, loads included
    revision: u64,
    /// Commits made by commands, updates, undo or redo
    edits: u64,
}

impl EditingEngine {
    /// Create a new editing engine with an empty document
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self::with_tree(DocumentTree::with_empty_paragraph(), config)
    }

    /// Create an editing engine with a specific document tree, the default
    /// node types and the default command handlers
    pub fn with_tree(tree: DocumentTree, config: EditorConfig) -> Self {
        let registry = NodeRegistry::with_defaults();
        let selection = position::first_caret(&tree, &registry);
        let mut bus = CommandBus::new();
        handlers::register_defaults(&mut bus);
        Self {
            tree,
            selection,
            registry,
            history: History::new(config.history.max_entries),
            config,
            bus,
            listeners: Vec::new(),
            next_listener: 0,
            revision: 0,
            edits: 0,
        }
    }

    /// Get the current document tree
    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    /// Get the current selection
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Set the selection. Both endpoints must name nodes of the document;
    /// offsets past the end are clamped.
    pub fn set_selection(&mut self, selection: Selection) -> Result<()> {
        let anchor = position::clamp(&self.tree, &selection.anchor);
        let focus = position::clamp(&self.tree, &selection.focus);
        match (anchor, focus) {
            (Some(anchor), Some(focus)) => {
                self.selection = Selection::new(anchor, focus);
                Ok(())
            }
            _ => Err(EditError::InvalidCommand("selection names a node outside the document".into())),
        }
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Mutable access for registering additional node types
    pub fn registry_mut(&mut self) -> &mut NodeRegistry {
        &mut self.registry
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether any edit has been committed since the engine was created
    pub fn has_edits(&self) -> bool {
        self.edits > 0
    }

    /// Register a command handler on this engine's bus
    pub fn register_handler<F>(&mut self, kind: CommandKind, priority: CommandPriority, handler: F) -> HandlerId
    where
        F: Fn(&EditorCommand, &mut Transaction<'_>) -> Result<bool> + 'static,
    {
        self.bus.register(kind, priority, handler)
    }

    pub fn unregister_handler(&mut self, id: HandlerId) -> bool {
        self.bus.unregister(id)
    }

    /// Dispatch a command. Returns whether a handler took it and the result
    /// committed; failures are logged and leave the document untouched.
    pub fn dispatch(&mut self, command: &EditorCommand) -> bool {
        match self.try_dispatch(command) {
            Ok(handled) => handled,
            Err(e) => {
                tracing::warn!(command = %command.kind(), error = %e, "command failed, transaction rolled back");
                false
            }
        }
    }

    /// Like `dispatch`, but hands back the error of a failed command
    pub fn try_dispatch(&mut self, command: &EditorCommand) -> Result<bool> {
        let kind = command.kind();
        let _span = tracing::debug_span!("dispatch", command = %kind).entered();

        let mut tx = Transaction::new(self.tree.clone(), self.selection, &self.registry, &self.config);
        if !self.bus.dispatch(command, &mut tx)? {
            tracing::debug!("no handler took the command");
            return Ok(false);
        }
        let (tree, selection) = tx.commit()?;
        self.apply_commit(tree, selection, kind.as_str(), UpdateOrigin::Command(kind));
        Ok(true)
    }

    /// Run `f` as one transaction. Nothing is committed if it fails.
    pub fn update<F>(&mut self, label: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<()>,
    {
        let mut tx = Transaction::new(self.tree.clone(), self.selection, &self.registry, &self.config);
        f(&mut tx)?;
        let (tree, selection) = tx.commit()?;
        self.apply_commit(tree, selection, label, UpdateOrigin::Update(label.to_string()));
        Ok(())
    }

    /// Replace the whole document without recording history
    pub fn replace_document(&mut self, mut tree: DocumentTree) -> Result<()> {
        let mut selection = position::first_caret(&tree, &self.registry);
        normalize::normalize(&mut tree, &self.registry, &mut selection)?;
        normalize::validate(&tree, &self.registry)?;
        self.tree = tree;
        self.selection = position::first_caret(&self.tree, &self.registry);
        self.history.clear();
        self.revision += 1;
        tracing::debug!(nodes = self.tree.len(), "document replaced");
        self.notify(UpdateOrigin::Load);
        Ok(())
    }

    /// Undo the last committed edit
    pub fn undo(&mut self) -> Result<()> {
        let current = Snapshot::new(self.tree.clone(), self.selection, "undo");
        let previous = self.history.undo(current)?;
        self.restore(previous, UpdateOrigin::Undo);
        Ok(())
    }

    /// Redo the last undone edit
    pub fn redo(&mut self) -> Result<()> {
        let current = Snapshot::new(self.tree.clone(), self.selection, "redo");
        let next = self.history.redo(current)?;
        self.restore(next, UpdateOrigin::Redo);
        Ok(())
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Call `listener` after every committed change
    pub fn add_update_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&DocumentUpdate<'_>) + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_update_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    fn apply_commit(&mut self, tree: DocumentTree, selection: Selection, label: &str, origin: UpdateOrigin) {
        let before = std::mem::replace(&mut self.tree, tree);
        self.history.push(Snapshot::new(before, self.selection, label));
        self.selection = selection;
        self.revision += 1;
        self.edits += 1;
        tracing::debug!(revision = self.revision, label, "transaction committed");
        self.notify(origin);
    }

    fn restore(&mut self, snapshot: Snapshot, origin: UpdateOrigin) {
        self.tree = snapshot.tree;
        self.selection = snapshot.selection;
        self.revision += 1;
        self.edits += 1;
        self.notify(origin);
    }

    fn notify(&mut self, origin: UpdateOrigin) {
        let update = DocumentUpdate {
            tree: &self.tree,
            selection: self.selection,
            revision: self.revision,
            origin,
        };
        for (_, listener) in &mut self.listeners {
            listener(&update);
        }
    }
}

impl Default for EditingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EditingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditingEngine")
            .field("nodes", &self.tree.len())
            .field("selection", &self.selection)
            .field("revision", &self.revision)
            .field("bus", &self.bus)
            .finish()
    }
}
