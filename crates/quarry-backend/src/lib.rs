//! Database backend over a document store: connection settings, a lazily
//! opened store handle, and a façade that sends query descriptions through
//! the compilers.

mod connector;
mod error;
mod operations;
mod settings;
mod wrapper;

#[cfg(feature = "memory")]
pub use connector::MemoryConnector;
pub use connector::Connector;
pub use error::BackendError;
pub use operations::{CompilerKind, DatabaseFeatures, DatabaseOperations};
pub use settings::{DEFAULT_HOST, DEFAULT_NAME, Settings};
pub use wrapper::{DatabaseWrapper, StoreRows, WriteOutcome};
