#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use bson::{Bson, Document};
use quarry_compiler::{InsertCompiler, SelectCompiler};
use quarry_query::{Atom, FieldKind, InsertQuery, Model, SelectQuery, WhereGroup, WhereNode};
use quarry_store::{InsertResult, MemoryCursor, MemoryStore, Store, StoreError, UpdateResult};

pub fn artist() -> Model {
    Model::new("artist")
        .primary_key("id")
        .column("name", FieldKind::Text)
        .column("good", FieldKind::Boolean)
        .column("current_group_id", FieldKind::ForeignKey)
}

pub fn group() -> Model {
    Model::new("group")
        .primary_key("id")
        .column("name", FieldKind::Text)
        .column("year_formed", FieldKind::Integer)
}

/// `Model.objects.create(**values)`: every column is written, unset ones as
/// null. Returns the assigned pk.
pub fn create(store: &impl Store, model: &Model, values: &[(&str, Bson)]) -> Bson {
    let mut query = InsertQuery::new(model.clone());
    for spec in &model.row.columns {
        let value = values
            .iter()
            .find(|(c, _)| *c == spec.name)
            .map(|(_, v)| v.clone())
            .unwrap_or(Bson::Null);
        query = query.value(spec.name.as_str(), value);
    }
    InsertCompiler::new(&query)
        .insert(store, true)
        .unwrap()
        .expect("insert returned no id")
}

/// `Model.objects.filter(column=value)` as a WHERE atom.
pub fn eq(model: &Model, column: &str, value: impl Into<Bson>) -> WhereNode {
    Atom::exact(model.field(column).unwrap(), value).into()
}

pub fn select(model: &Model, where_: WhereGroup) -> SelectQuery {
    SelectQuery::new(model.clone()).filter(where_)
}

/// All rows matching, decoded.
pub fn rows(store: &impl Store, query: &SelectQuery) -> Vec<Vec<Bson>> {
    SelectCompiler::new(query)
        .results_iter(store)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}

/// Values of one column over the matching rows.
pub fn column(store: &impl Store, query: &SelectQuery, name: &str) -> Vec<Bson> {
    let idx = query
        .model
        .row
        .columns
        .iter()
        .position(|c| c.name == name)
        .unwrap();
    rows(store, query).into_iter().map(|mut r| r.swap_remove(idx)).collect()
}

/// Store double that counts every call before delegating to a `MemoryStore`.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    calls: AtomicUsize,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl Store for RecordingStore {
    type Cursor<'a> = MemoryCursor;

    fn find(&self, collection: &str, filter: &Document) -> Result<Self::Cursor<'_>, StoreError> {
        self.record();
        self.inner.find(collection, filter)
    }

    fn count(&self, collection: &str, filter: &Document) -> Result<u64, StoreError> {
        self.record();
        self.inner.count(collection, filter)
    }

    fn insert_one(&self, collection: &str, doc: Document) -> Result<InsertResult, StoreError> {
        self.record();
        self.inner.insert_one(collection, doc)
    }

    fn update_many(
        &self,
        collection: &str,
        filter: &Document,
        update: &Document,
    ) -> Result<UpdateResult, StoreError> {
        self.record();
        self.inner.update_many(collection, filter, update)
    }

    fn create_collection(&self, name: &str) -> Result<(), StoreError> {
        self.record();
        self.inner.create_collection(name)
    }

    fn drop_collection(&self, name: &str) -> Result<(), StoreError> {
        self.record();
        self.inner.drop_collection(name)
    }

    fn list_collections(&self) -> Result<Vec<String>, StoreError> {
        self.record();
        self.inner.list_collections()
    }
}

/// A store whose every call fails, for error propagation tests.
pub struct DownStore;

impl Store for DownStore {
    type Cursor<'a> = std::iter::Empty<Result<Document, StoreError>>;

    fn find(&self, _: &str, _: &Document) -> Result<Self::Cursor<'_>, StoreError> {
        Err(down())
    }

    fn count(&self, _: &str, _: &Document) -> Result<u64, StoreError> {
        Err(down())
    }

    fn insert_one(&self, _: &str, _: Document) -> Result<InsertResult, StoreError> {
        Err(down())
    }

    fn update_many(&self, _: &str, _: &Document, _: &Document) -> Result<UpdateResult, StoreError> {
        Err(down())
    }

    fn create_collection(&self, _: &str) -> Result<(), StoreError> {
        Err(down())
    }

    fn drop_collection(&self, _: &str) -> Result<(), StoreError> {
        Err(down())
    }

    fn list_collections(&self) -> Result<Vec<String>, StoreError> {
        Err(down())
    }
}

fn down() -> StoreError {
    StoreError::Storage("connection refused".into())
}
