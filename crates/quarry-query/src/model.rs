use serde::{Deserialize, Serialize};

use crate::field::{ColumnRef, FieldKind, FieldRef};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default = "default_kind")]
    pub kind: FieldKind,
}

fn default_kind() -> FieldKind {
    FieldKind::Text
}

/// Ordered columns of a model, in the order rows are decoded.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RowDescriptor {
    pub columns: Vec<ColumnSpec>,
}

impl RowDescriptor {
    pub fn primary_key(&self) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.primary_key)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Metadata of one model: the collection it lives in and its columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub db_table: String,
    pub row: RowDescriptor,
}

impl Model {
    pub fn new(db_table: impl Into<String>) -> Self {
        Self {
            db_table: db_table.into(),
            row: RowDescriptor::default(),
        }
    }

    pub fn primary_key(mut self, name: impl Into<String>) -> Self {
        self.row.columns.push(ColumnSpec {
            name: name.into(),
            primary_key: true,
            kind: FieldKind::Auto,
        });
        self
    }

    pub fn column(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.row.columns.push(ColumnSpec {
            name: name.into(),
            primary_key: false,
            kind,
        });
        self
    }

    pub fn pk_column(&self) -> Option<&str> {
        self.row.primary_key().map(|c| c.name.as_str())
    }

    pub fn is_pk(&self, column: &str) -> bool {
        self.pk_column() == Some(column)
    }

    /// Typed reference to one of this model's columns.
    pub fn field(&self, name: &str) -> Option<FieldRef> {
        self.row.columns.iter().find(|c| c.name == name).map(|c| FieldRef {
            column: ColumnRef::new(self.db_table.as_str(), c.name.as_str()),
            kind: c.kind,
        })
    }
}
