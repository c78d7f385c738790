//! Error types for the editor facade

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Edit error: {0}")]
    Edit(#[from] edit_engine::EditError),

    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
