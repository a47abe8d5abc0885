use bson::{Document, doc};
use quarry_query::UpdateQuery;
use quarry_store::Store;

use crate::error::CompileError;
use crate::filters::compile_filters;

pub struct UpdateCompiler<'q> {
    query: &'q UpdateQuery,
}

impl<'q> UpdateCompiler<'q> {
    pub fn new(query: &'q UpdateQuery) -> Self {
        Self { query }
    }

    /// Filter and `$set` document for the update.
    pub fn build(&self) -> Result<(Document, Document), CompileError> {
        let model = &self.query.model;
        let filter = compile_filters(&self.query.where_, model)?.to_document();

        let mut set = Document::new();
        for (column, value) in &self.query.values {
            if model.is_pk(column) {
                return Err(CompileError::shape("primary key update"));
            }
            set.insert(column.clone(), value.clone());
        }
        Ok((filter, doc! { "$set": set }))
    }

    /// Apply the update to every matching row. Returns the number of rows
    /// the store reports as modified.
    pub fn update<S: Store>(&self, store: &S) -> Result<u64, CompileError> {
        let (filter, update) = self.build()?;
        if self.query.values.is_empty() {
            return Ok(0);
        }
        let collection = self.query.model.db_table.as_str();
        tracing::debug!(collection, %filter, %update, "update many");
        let result = store.update_many(collection, &filter, &update)?;
        Ok(result.modified)
    }
}
