use bson::{Bson, Document};
use quarry_query::RowDescriptor;
use quarry_store::StoreError;

use crate::constraint::ID_FIELD;
use crate::error::CompileError;

/// Maps store documents to positional rows.
#[derive(Debug, Clone, Copy)]
pub struct RowDecoder<'a> {
    row: &'a RowDescriptor,
}

impl<'a> RowDecoder<'a> {
    pub fn new(row: &'a RowDescriptor) -> Self {
        Self { row }
    }

    /// One value per declared column, in declaration order. The primary key
    /// is read from `_id`.
    pub fn decode(&self, doc: &Document) -> Result<Vec<Bson>, CompileError> {
        self.row
            .columns
            .iter()
            .map(|column| {
                let key = if column.primary_key {
                    ID_FIELD
                } else {
                    column.name.as_str()
                };
                doc.get(key)
                    .cloned()
                    .ok_or_else(|| CompileError::MissingField(column.name.clone()))
            })
            .collect()
    }
}

/// Lazy stream of decoded rows over a store cursor.
pub struct Rows<'a, C> {
    cursor: C,
    decoder: RowDecoder<'a>,
}

impl<'a, C> Rows<'a, C> {
    pub(crate) fn new(cursor: C, decoder: RowDecoder<'a>) -> Self {
        Self { cursor, decoder }
    }
}

impl<C> Iterator for Rows<'_, C>
where
    C: Iterator<Item = Result<Document, StoreError>>,
{
    type Item = Result<Vec<Bson>, CompileError>;

    fn next(&mut self) -> Option<Self::Item> {
        let doc = match self.cursor.next()? {
            Ok(doc) => doc,
            Err(e) => return Some(Err(e.into())),
        };
        let row = self.decoder.decode(&doc);
        if row.is_ok() {
            tracing::trace!(document = %doc, "decoded row");
        }
        Some(row)
    }
}
