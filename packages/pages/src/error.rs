use thiserror::Error;

/// Persistence failures, surfaced to callers unchanged
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Page not found: {0}")]
    NotFound(String),

    #[error("Page already exists: {0}")]
    AlreadyExists(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document error: {0}")]
    Document(#[from] pagecraft_model::DocumentError),

    #[error("Metadata error: {0}")]
    Json(#[from] serde_json::Error),
}
