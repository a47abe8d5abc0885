use std::sync::Arc;

use bson::Document;

use crate::error::StoreError;
use crate::eval::matches;
use crate::filter::Expression;

use super::store::Collection;

/// Streaming cursor over a collection snapshot.
///
/// Holds its own snapshot, so writes that land after `find` returns are not
/// observed. Documents are matched lazily as the cursor advances.
pub struct MemoryCursor {
    docs: Arc<Collection>,
    position: usize,
    expr: Expression,
}

impl MemoryCursor {
    pub(crate) fn new(docs: Arc<Collection>, expr: Expression) -> Self {
        Self {
            docs,
            position: 0,
            expr,
        }
    }
}

impl Iterator for MemoryCursor {
    type Item = Result<Document, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(doc) = self.docs.get(self.position) {
            self.position += 1;
            if matches(doc, &self.expr) {
                return Some(Ok(doc.clone()));
            }
        }
        None
    }
}
