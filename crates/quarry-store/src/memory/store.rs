use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use arc_swap::ArcSwap;
use bson::oid::ObjectId;
use bson::{Bson, Document};
use imbl::Vector;

use crate::error::StoreError;
use crate::eval::{matches, value_eq};
use crate::filter::{Expression, parse_filter};
use crate::result::{InsertResult, UpdateResult};
use crate::store::Store;
use crate::update::parse_update;

use super::cursor::MemoryCursor;

pub(crate) type Collection = Vector<Document>;

/// In-memory document store.
///
/// Each collection is a persistent vector behind an `ArcSwap`: readers take a
/// snapshot and iterate it without locking, writers serialize on
/// `write_lock` and publish a new version.
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Arc<ArcSwap<Collection>>>>,
    write_lock: Mutex<()>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Snapshot a collection. Cheap due to imbl structural sharing.
    fn snapshot(&self, name: &str) -> Result<Option<Arc<Collection>>, StoreError> {
        let collections = self
            .collections
            .read()
            .map_err(|e| StoreError::Storage(format!("collection map poisoned: {e}")))?;
        Ok(collections.get(name).map(|arc| arc.load_full()))
    }

    /// Get a collection handle, creating it on first write.
    fn handle(&self, name: &str) -> Result<Arc<ArcSwap<Collection>>, StoreError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| StoreError::Storage(format!("collection map poisoned: {e}")))?;
        Ok(Arc::clone(
            collections
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(ArcSwap::from_pointee(Vector::new()))),
        ))
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_lock
            .lock()
            .map_err(|e| StoreError::Storage(format!("write lock poisoned: {e}")))
    }

    fn scan(&self, collection: &str, filter: &Document) -> Result<MemoryCursor, StoreError> {
        let expr = parse_filter(filter)?;
        let docs = self.snapshot(collection)?.unwrap_or_default();
        Ok(MemoryCursor::new(docs, expr))
    }
}

fn with_id_first(id: Bson, doc: Document) -> Document {
    let mut out = Document::new();
    out.insert("_id", id);
    for (k, v) in doc {
        if k != "_id" {
            out.insert(k, v);
        }
    }
    out
}

impl Store for MemoryStore {
    type Cursor<'a> = MemoryCursor;

    fn find(&self, collection: &str, filter: &Document) -> Result<Self::Cursor<'_>, StoreError> {
        self.scan(collection, filter)
    }

    fn count(&self, collection: &str, filter: &Document) -> Result<u64, StoreError> {
        let mut count = 0;
        for doc in self.scan(collection, filter)? {
            doc?;
            count += 1;
        }
        Ok(count)
    }

    fn insert_one(&self, collection: &str, doc: Document) -> Result<InsertResult, StoreError> {
        let _guard = self.lock_writes()?;
        let handle = self.handle(collection)?;
        let mut docs = (**handle.load()).clone();

        let id = match doc.get("_id") {
            Some(id) => {
                if docs
                    .iter()
                    .any(|d| d.get("_id").is_some_and(|existing| value_eq(existing, id)))
                {
                    return Err(StoreError::DuplicateKey(format!("{collection}._id = {id}")));
                }
                id.clone()
            }
            None => Bson::ObjectId(ObjectId::new()),
        };

        docs.push_back(with_id_first(id.clone(), doc));
        handle.store(Arc::new(docs));
        tracing::trace!(collection, %id, "inserted document");
        Ok(InsertResult { id })
    }

    fn update_many(
        &self,
        collection: &str,
        filter: &Document,
        update: &Document,
    ) -> Result<UpdateResult, StoreError> {
        let expr: Expression = parse_filter(filter)?;
        let update = parse_update(update)?;

        let _guard = self.lock_writes()?;
        let Some(current) = self.snapshot(collection)? else {
            return Ok(UpdateResult::default());
        };

        let mut docs = (*current).clone();
        let mut result = UpdateResult::default();
        for doc in docs.iter_mut() {
            if !matches(doc, &expr) {
                continue;
            }
            result.matched += 1;
            if update.apply(doc) {
                result.modified += 1;
            }
        }

        if result.modified > 0 {
            self.handle(collection)?.store(Arc::new(docs));
        }
        tracing::trace!(collection, matched = result.matched, modified = result.modified, "updated documents");
        Ok(result)
    }

    fn create_collection(&self, name: &str) -> Result<(), StoreError> {
        self.handle(name).map(|_| ())
    }

    fn drop_collection(&self, name: &str) -> Result<(), StoreError> {
        let _guard = self.lock_writes()?;
        let mut collections = self
            .collections
            .write()
            .map_err(|e| StoreError::Storage(format!("collection map poisoned: {e}")))?;
        collections.remove(name);
        Ok(())
    }

    fn list_collections(&self) -> Result<Vec<String>, StoreError> {
        let collections = self
            .collections
            .read()
            .map_err(|e| StoreError::Storage(format!("collection map poisoned: {e}")))?;
        let mut names: Vec<String> = collections.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
