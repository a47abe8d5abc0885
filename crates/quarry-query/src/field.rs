use bson::Bson;
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::lookup::Lookup;

/// A value could not be converted to the storage type of the field it is
/// compared against.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("cannot prepare {value} for {kind:?} column {column}")]
pub struct PrepareError {
    pub column: String,
    pub kind: FieldKind,
    pub value: Bson,
}

/// A `(table, column)` pair naming a stored column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// Output of [`ResolveField::resolve`]: the column the predicate targets and
/// the value prepared for comparison against it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    pub column: ColumnRef,
    pub value: Bson,
}

/// Resolves the left-hand side of a predicate into a stored column and
/// prepares the lookup value for it.
pub trait ResolveField {
    fn resolve(&self, lookup: Lookup, value: &Bson) -> Result<ResolvedField, PrepareError>;
}

impl ResolveField for ColumnRef {
    fn resolve(&self, _lookup: Lookup, value: &Bson) -> Result<ResolvedField, PrepareError> {
        Ok(ResolvedField {
            column: self.clone(),
            value: value.clone(),
        })
    }
}

/// Storage type of a model field. Drives lookup-value preparation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Auto,
    Integer,
    Boolean,
    Text,
    ForeignKey,
}

/// A model field: column reference plus the kind used to coerce values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRef {
    pub column: ColumnRef,
    pub kind: FieldKind,
}

impl FieldRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            column: ColumnRef::new(table, column),
            kind,
        }
    }

    fn prepare(&self, value: &Bson) -> Result<Bson, PrepareError> {
        let prepared = match (self.kind, value) {
            (_, Bson::Null) => Some(Bson::Null),

            (FieldKind::Auto | FieldKind::ForeignKey, Bson::ObjectId(_)) => Some(value.clone()),
            (FieldKind::Auto | FieldKind::ForeignKey, Bson::String(s)) => match ObjectId::parse_str(s) {
                Ok(oid) => Some(Bson::ObjectId(oid)),
                Err(_) => s.parse::<i64>().ok().map(Bson::Int64),
            },
            (FieldKind::Auto | FieldKind::ForeignKey | FieldKind::Integer, _) => integer(value),

            (FieldKind::Boolean, Bson::Boolean(_)) => Some(value.clone()),
            (FieldKind::Boolean, Bson::Int32(0)) | (FieldKind::Boolean, Bson::Int64(0)) => {
                Some(Bson::Boolean(false))
            }
            (FieldKind::Boolean, Bson::Int32(1)) | (FieldKind::Boolean, Bson::Int64(1)) => {
                Some(Bson::Boolean(true))
            }
            (FieldKind::Boolean, _) => None,

            (FieldKind::Text, Bson::String(_)) => Some(value.clone()),
            (FieldKind::Text, _) => None,
        };

        prepared.ok_or_else(|| PrepareError {
            column: self.column.column.clone(),
            kind: self.kind,
            value: value.clone(),
        })
    }
}

fn integer(value: &Bson) -> Option<Bson> {
    match value {
        Bson::Int32(_) | Bson::Int64(_) => Some(value.clone()),
        // i64::MAX as f64 rounds up to 2^63, which is out of range
        Bson::Double(d)
            if d.fract() == 0.0 && *d >= i64::MIN as f64 && *d < i64::MAX as f64 =>
        {
            Some(Bson::Int64(*d as i64))
        }
        Bson::String(s) => s.trim().parse::<i64>().ok().map(Bson::Int64),
        _ => None,
    }
}

impl ResolveField for FieldRef {
    fn resolve(&self, lookup: Lookup, value: &Bson) -> Result<ResolvedField, PrepareError> {
        // isnull carries a flag, not a column value
        let value = match lookup {
            Lookup::IsNull => value.clone(),
            _ => self.prepare(value)?,
        };
        Ok(ResolvedField {
            column: self.column.clone(),
            value,
        })
    }
}

/// Left-hand side of a predicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lhs {
    Column(ColumnRef),
    Field(FieldRef),
}

impl ResolveField for Lhs {
    fn resolve(&self, lookup: Lookup, value: &Bson) -> Result<ResolvedField, PrepareError> {
        match self {
            Lhs::Column(column) => column.resolve(lookup, value),
            Lhs::Field(field) => field.resolve(lookup, value),
        }
    }
}

impl From<ColumnRef> for Lhs {
    fn from(column: ColumnRef) -> Self {
        Lhs::Column(column)
    }
}

impl From<FieldRef> for Lhs {
    fn from(field: FieldRef) -> Self {
        Lhs::Field(field)
    }
}
