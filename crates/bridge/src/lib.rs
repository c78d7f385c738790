//! Bridge - The editor as seen from outside the kernel
//!
//! Collaborators that produce content (AI streams, paste handlers) see only
//! [`EditorBridge`]: insert some HTML at the selection, read the document
//! back as HTML. UI producers additionally dispatch commands by name.

mod editor;
mod error;
mod logging;

pub use editor::*;
pub use error::*;
pub use logging::init_tracing;
