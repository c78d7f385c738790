//! Store - Serialization gateway
//!
//! Converts a document tree to and from its two external forms: the
//! versioned JSON form, which is lossless and used for save and reload, and
//! HTML, which is used for interchange and is lossy for node semantics HTML
//! cannot express.

mod error;
mod import;
mod json;
mod file_io;
pub mod html;

pub use error::*;
pub use import::*;
pub use json::*;
pub use file_io::*;
pub use html::{export_html, export_node_html, import_html, parse_html, HtmlImport};
