use bson::{Bson, Document};

use crate::error::StoreError;
use crate::eval::value_eq;

#[derive(Debug, Clone, PartialEq)]
enum FieldUpdate {
    Set(String, Bson),
    Unset(String),
}

/// A validated update document.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    ops: Vec<FieldUpdate>,
}

/// Parse an update document. Only `$set` and `$unset` are understood; `_id`
/// is immutable.
pub fn parse_update(doc: &Document) -> Result<Update, StoreError> {
    let mut ops = Vec::new();

    for (op, value) in doc {
        let fields = match value {
            Bson::Document(fields) => fields,
            _ => {
                return Err(StoreError::InvalidUpdate(format!(
                    "{op} value must be a document"
                )));
            }
        };
        for (field, v) in fields {
            if field == "_id" {
                return Err(StoreError::InvalidUpdate("_id is immutable".into()));
            }
            match op.as_str() {
                "$set" => ops.push(FieldUpdate::Set(field.clone(), v.clone())),
                "$unset" => ops.push(FieldUpdate::Unset(field.clone())),
                k => {
                    return Err(StoreError::InvalidUpdate(format!(
                        "unsupported update operator: {k}"
                    )));
                }
            }
        }
    }

    if ops.is_empty() {
        return Err(StoreError::InvalidUpdate("empty update document".into()));
    }
    Ok(Update { ops })
}

impl Update {
    /// Apply to `doc` in place. Returns whether anything changed.
    pub fn apply(&self, doc: &mut Document) -> bool {
        let mut changed = false;
        for op in &self.ops {
            match op {
                FieldUpdate::Set(field, value) => {
                    // a wider integer of the same value is not a change
                    if !doc.get(field).is_some_and(|current| value_eq(current, value)) {
                        doc.insert(field.clone(), value.clone());
                        changed = true;
                    }
                }
                FieldUpdate::Unset(field) => {
                    changed |= doc.remove(field).is_some();
                }
            }
        }
        changed
    }
}
