mod cursor;
mod store;

pub use cursor::MemoryCursor;
pub use store::MemoryStore;
