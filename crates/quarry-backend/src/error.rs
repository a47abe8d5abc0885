use quarry_compiler::CompileError;
use quarry_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("unknown compiler: {0}")]
    UnknownCompiler(String),
    #[error("config error: {0}")]
    Config(String),
}

impl BackendError {
    /// The query asked for something this backend cannot express.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            BackendError::Compile(
                CompileError::UnsupportedLookup(_)
                    | CompileError::UnsupportedQueryShape(_)
                    | CompileError::UnsupportedAggregate(_)
            )
        )
    }
}
