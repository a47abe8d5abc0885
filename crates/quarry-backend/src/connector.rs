use quarry_store::{Store, StoreError};

use crate::settings::Settings;

/// Opens store handles.
pub trait Connector {
    type Store: Store;

    fn connect(&self, settings: &Settings) -> Result<Self::Store, StoreError>;
}

/// Connects to a fresh, empty [`MemoryStore`](quarry_store::MemoryStore).
/// Host and port are ignored.
#[cfg(feature = "memory")]
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryConnector;

#[cfg(feature = "memory")]
impl Connector for MemoryConnector {
    type Store = quarry_store::MemoryStore;

    fn connect(&self, _settings: &Settings) -> Result<Self::Store, StoreError> {
        Ok(quarry_store::MemoryStore::new())
    }
}
