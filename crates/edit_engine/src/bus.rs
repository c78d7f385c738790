//! Command bus: per-command handler lists ordered by priority tier
//!
//! The bus is owned by one engine; nothing is registered globally.

use crate::{CommandKind, EditorCommand, Result, Transaction};
use std::collections::HashMap;

/// Priority tier of a handler. Higher tiers run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum CommandPriority {
    Low,
    #[default]
    Normal,
    High,
}

/// Handle returned by `register`, used to remove the handler again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// A command handler.
///
/// Returns `Ok(true)` when it handled the command, which stops propagation.
/// A handler returning `Ok(false)` must leave the transaction untouched.
/// An error aborts the whole transaction.
pub type CommandHandler = Box<dyn Fn(&EditorCommand, &mut Transaction<'_>) -> Result<bool>>;

struct Registration {
    id: HandlerId,
    priority: CommandPriority,
    handler: CommandHandler,
}

/// Registry of command handlers
#[derive(Default)]
pub struct CommandBus {
    handlers: HashMap<CommandKind, Vec<Registration>>,
    next_id: u64,
}

impl CommandBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `kind`. Within a tier, earlier registrations
    /// run first.
    pub fn register<F>(&mut self, kind: CommandKind, priority: CommandPriority, handler: F) -> HandlerId
    where
        F: Fn(&EditorCommand, &mut Transaction<'_>) -> Result<bool> + 'static,
    {
        let id = HandlerId(self.next_id);
        self.next_id += 1;

        let list = self.handlers.entry(kind).or_default();
        // Stable position: after every handler of the same or higher tier.
        let at = list
            .iter()
            .position(|r| r.priority < priority)
            .unwrap_or(list.len());
        list.insert(
            at,
            Registration {
                id,
                priority,
                handler: Box::new(handler),
            },
        );
        tracing::trace!(command = %kind, ?priority, "registered command handler");
        id
    }

    /// Remove a handler; returns whether it was registered
    pub fn unregister(&mut self, id: HandlerId) -> bool {
        for list in self.handlers.values_mut() {
            if let Some(pos) = list.iter().position(|r| r.id == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn handler_count(&self, kind: CommandKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    /// Run handlers for `command` in priority order until one handles it
    pub fn dispatch(&self, command: &EditorCommand, tx: &mut Transaction<'_>) -> Result<bool> {
        let Some(list) = self.handlers.get(&command.kind()) else {
            return Ok(false);
        };
        for registration in list {
            if (registration.handler)(command, tx)? {
                tracing::trace!(command = %command.kind(), priority = ?registration.priority, "command handled");
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl std::fmt::Debug for CommandBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<_, _> = self.handlers.iter().map(|(k, v)| (*k, v.len())).collect();
        f.debug_struct("CommandBus").field("handlers", &counts).finish()
    }
}
