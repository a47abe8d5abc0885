use bson::{Bson, Document};
use quarry_query::InsertQuery;
use quarry_store::Store;

use crate::constraint::ID_FIELD;
use crate::error::CompileError;

pub struct InsertCompiler<'q> {
    query: &'q InsertQuery,
}

impl<'q> InsertCompiler<'q> {
    pub fn new(query: &'q InsertQuery) -> Self {
        Self { query }
    }

    /// The document to insert: the primary key becomes `_id`, and a falsy
    /// `_id` is left out so the store assigns one.
    pub fn build_document(&self) -> Document {
        let model = &self.query.model;
        let mut doc = Document::new();
        for (column, value) in &self.query.values {
            let key = if model.is_pk(column) { ID_FIELD } else { column.as_str() };
            doc.insert(key, value.clone());
        }
        if doc.get(ID_FIELD).is_some_and(is_falsy) {
            doc.remove(ID_FIELD);
        }
        doc
    }

    /// Insert the row. Returns the stored `_id` when `return_id` is set.
    pub fn insert<S: Store>(&self, store: &S, return_id: bool) -> Result<Option<Bson>, CompileError> {
        let doc = self.build_document();
        let collection = self.query.model.db_table.as_str();
        tracing::debug!(collection, document = %doc, "insert");
        let result = store.insert_one(collection, doc)?;
        Ok(return_id.then_some(result.id))
    }
}

fn is_falsy(value: &Bson) -> bool {
    match value {
        Bson::Null | Bson::Undefined => true,
        Bson::Boolean(b) => !b,
        Bson::Int32(i) => *i == 0,
        Bson::Int64(i) => *i == 0,
        Bson::Double(d) => *d == 0.0,
        Bson::String(s) => s.is_empty(),
        Bson::Array(a) => a.is_empty(),
        Bson::Document(d) => d.is_empty(),
        _ => false,
    }
}
