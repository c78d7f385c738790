//! Edit Engine - Commands, transactions, and undo/redo
//!
//! Every change to a document goes through a `Transaction`: a private copy
//! of the tree that handlers mutate and that is normalized and validated
//! before it replaces the live document. Commands are plain messages routed
//! through a per-engine `CommandBus` whose handlers are ordered by priority
//! tier.

mod command;
mod bus;
mod transaction;
mod insert;
mod normalize;
mod history;
mod config;
mod error;
mod executor;
mod handlers;
pub mod position;
pub mod block_commands;
pub mod list_commands;
pub mod citation_commands;
pub mod image_commands;
pub mod table_commands;
pub mod comment_commands;
pub mod text_commands;

pub use command::*;
pub use bus::*;
pub use transaction::*;
pub use insert::split_block;
pub use normalize::{normalize, validate};
pub use history::*;
pub use config::*;
pub use error::*;
pub use executor::*;
pub use handlers::register_defaults;
