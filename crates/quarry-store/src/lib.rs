mod error;
mod eval;
mod filter;
mod result;
mod store;
mod update;

pub use error::StoreError;
pub use eval::matches;
pub use filter::{Condition, Expression, parse_filter};
pub use result::{InsertResult, UpdateResult};
pub use store::Store;
pub use update::{Update, parse_update};

#[cfg(feature = "memory")]
mod memory;

#[cfg(feature = "memory")]
pub use memory::{MemoryCursor, MemoryStore};
