use bson::Document;

use crate::error::StoreError;
use crate::result::{InsertResult, UpdateResult};

/// A schemaless document store addressed by collection name.
///
/// Filters and updates use the MongoDB document vocabulary. Every call is a
/// single round trip; nothing is retried.
pub trait Store {
    /// Lazy stream of matching documents. Reissue [`Store::find`] to restart.
    type Cursor<'a>: Iterator<Item = Result<Document, StoreError>>
    where
        Self: 'a;

    fn find(&self, collection: &str, filter: &Document) -> Result<Self::Cursor<'_>, StoreError>;
    fn count(&self, collection: &str, filter: &Document) -> Result<u64, StoreError>;

    /// Insert one document. A missing `_id` is assigned by the store.
    fn insert_one(&self, collection: &str, doc: Document) -> Result<InsertResult, StoreError>;

    /// Apply `update` to every document matching `filter`.
    fn update_many(
        &self,
        collection: &str,
        filter: &Document,
        update: &Document,
    ) -> Result<UpdateResult, StoreError>;

    // Schema
    fn create_collection(&self, name: &str) -> Result<(), StoreError>;
    fn drop_collection(&self, name: &str) -> Result<(), StoreError>;
    fn list_collections(&self) -> Result<Vec<String>, StoreError>;
}
