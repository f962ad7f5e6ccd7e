//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("History error: {0}")]
    History(#[from] crate::undo_stack::HistoryError),

    #[error("Document error: {0}")]
    Document(#[from] pagecraft_model::DocumentError),
}
