use bson::Document;
use quarry_query::{Aggregate, AggregateTarget, SelectQuery};
use quarry_store::Store;

use crate::decode::{RowDecoder, Rows};
use crate::error::CompileError;
use crate::filters::compile_filters;

/// Compiles read queries: row fetches, existence checks and counts.
pub struct SelectCompiler<'q> {
    query: &'q SelectQuery,
}

impl<'q> SelectCompiler<'q> {
    pub fn new(query: &'q SelectQuery) -> Self {
        Self { query }
    }

    /// Reject every relational feature the store cannot express.
    fn check_shape(&self, aggregates: bool) -> Result<(), CompileError> {
        let q = self.query;

        let mut active = q.active_aliases();
        if let Some(alias) = active.next() {
            if alias.table != q.model.db_table {
                return Err(CompileError::shape(format!("join: table {}", alias.table)));
            }
        }
        if active.next().is_some() {
            return Err(CompileError::shape("join: more than one table"));
        }
        if !aggregates && !q.default_cols {
            return Err(CompileError::shape("custom column selection"));
        }
        if q.distinct {
            return Err(CompileError::shape("DISTINCT"));
        }
        if !q.extra.is_empty() {
            return Err(CompileError::shape("extra select"));
        }
        if q.having.is_some() {
            return Err(CompileError::shape("HAVING"));
        }
        if q.high_mark.is_some() {
            return Err(CompileError::shape("LIMIT"));
        }
        if q.low_mark > 0 {
            return Err(CompileError::shape("OFFSET"));
        }
        if !q.order_by.is_empty() {
            return Err(CompileError::shape("ORDER BY"));
        }
        Ok(())
    }

    /// Validate the query and compile its filter document.
    pub fn build_filter(&self, aggregates: bool) -> Result<Document, CompileError> {
        self.check_shape(aggregates)?;
        Ok(compile_filters(&self.query.where_, &self.query.model)?.to_document())
    }

    /// Stream matching rows as positional tuples.
    pub fn results_iter<'s, S: Store>(
        &self,
        store: &'s S,
    ) -> Result<Rows<'q, S::Cursor<'s>>, CompileError> {
        let filter = self.build_filter(false)?;
        let collection = self.query.model.db_table.as_str();
        tracing::debug!(collection, %filter, "find");
        let cursor = store.find(collection, &filter)?;
        Ok(Rows::new(cursor, RowDecoder::new(&self.query.model.row)))
    }

    /// Whether at least one row matches. Reads no more than one document.
    pub fn has_results<S: Store>(&self, store: &S) -> Result<bool, CompileError> {
        let filter = self.build_filter(false)?;
        let collection = self.query.model.db_table.as_str();
        tracing::debug!(collection, %filter, "find one");
        match store.find(collection, &filter)?.next() {
            Some(doc) => doc.map(|_| true).map_err(CompileError::from),
            None => Ok(false),
        }
    }

    /// Evaluate the query's aggregates. Only a single `Count(*)` or
    /// `Count(pk)` is supported.
    pub fn get_aggregates<S: Store>(&self, store: &S) -> Result<Vec<u64>, CompileError> {
        let filter = self.build_count_filter()?;
        let collection = self.query.model.db_table.as_str();
        tracing::debug!(collection, %filter, "count");
        Ok(vec![store.count(collection, &filter)?])
    }

    /// Validate the aggregates and the query shape, and compile the filter
    /// the count runs with.
    pub fn build_count_filter(&self) -> Result<Document, CompileError> {
        self.check_aggregates()?;
        self.build_filter(true)
    }

    fn check_aggregates(&self) -> Result<(), CompileError> {
        let q = self.query;
        let agg = match q.aggregates.as_slice() {
            [agg] => agg,
            [] => return Err(CompileError::UnsupportedAggregate("no aggregate".into())),
            many => {
                let names: Vec<_> = many.iter().map(Aggregate::name).collect();
                return Err(CompileError::UnsupportedAggregate(format!(
                    "multiple aggregates ({})",
                    names.join(", ")
                )));
            }
        };

        match agg {
            Aggregate::Count { distinct: true, .. } => {
                Err(CompileError::UnsupportedAggregate("Count(distinct)".into()))
            }
            Aggregate::Count {
                target: AggregateTarget::Star,
                ..
            } => Ok(()),
            Aggregate::Count {
                target: AggregateTarget::Column(col),
                ..
            } if col.table == q.model.db_table && q.model.is_pk(&col.column) => Ok(()),
            Aggregate::Count {
                target: AggregateTarget::Column(col),
                ..
            } => Err(CompileError::UnsupportedAggregate(format!(
                "Count({}.{})",
                col.table, col.column
            ))),
            other => Err(CompileError::UnsupportedAggregate(other.name().to_string())),
        }
    }
}
