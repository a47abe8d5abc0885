#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
    #[error("invalid update: {0}")]
    InvalidUpdate(String),
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
    #[error("storage error: {0}")]
    Storage(String),
}
