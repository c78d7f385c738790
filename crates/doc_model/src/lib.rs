//! Document Model - Node tree, node-type registry and built-in node types
//!
//! This crate provides the in-memory model of a structured document: an
//! arena of typed nodes with stable keys, the registry that gives every
//! node type its JSON, render and HTML contracts, and the citation,
//! bibliography and image types layered on top of the generic rich-text
//! vocabulary.

mod node;
mod format;
mod selection;
mod fragment;
mod tree;
mod error;
mod dom;
mod render;
mod registry;
pub mod nodes;

pub use node::*;
pub use format::*;
pub use selection::*;
pub use fragment::*;
pub use tree::*;
pub use error::*;
pub use dom::*;
pub use render::*;
pub use registry::*;
