use quarry_query::PrepareError;
use quarry_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("unsupported lookup: {0}")]
    UnsupportedLookup(String),
    #[error("unsupported query shape: {0}")]
    UnsupportedQueryShape(String),
    #[error("unsupported aggregate: {0}")]
    UnsupportedAggregate(String),
    #[error("missing field in returned document: {0}")]
    MissingField(String),
    #[error(transparent)]
    InvalidValue(#[from] PrepareError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl CompileError {
    pub(crate) fn shape(what: impl Into<String>) -> Self {
        CompileError::UnsupportedQueryShape(what.into())
    }
}
