use bson::{Bson, Document, doc};

use crate::error::CompileError;

/// The store's reserved identity field.
pub const ID_FIELD: &str = "_id";

/// Constraint attached to one field of a filter document.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldConstraint {
    /// `{field: value}`
    Literal(Bson),
    /// `{field: {"$ne": value}}`
    Ne(Bson),
    /// `{field: {"$not": inner}}`
    Not(Box<FieldConstraint>),
    /// `{field: {"$and": [c1, c2, ...]}}`. Never directly contains another `And`.
    And(Vec<FieldConstraint>),
}

impl FieldConstraint {
    pub fn not(inner: FieldConstraint) -> Self {
        FieldConstraint::Not(Box::new(inner))
    }

    /// Logical negation of a single constraint.
    ///
    /// A conjunction negates to `Not(And(..))`, which the store cannot run;
    /// [`crate::filters`] splits conjunctions before negating their parts.
    pub fn negate(self) -> Self {
        match self {
            FieldConstraint::Not(inner) => *inner,
            FieldConstraint::Ne(value) => FieldConstraint::Literal(value),
            FieldConstraint::Literal(Bson::Null) => {
                FieldConstraint::not(FieldConstraint::Literal(Bson::Null))
            }
            FieldConstraint::Literal(value) => FieldConstraint::Ne(value),
            and @ FieldConstraint::And(_) => FieldConstraint::not(and),
        }
    }

    /// Conjunction of two constraints on the same field.
    pub fn and(self, incoming: FieldConstraint) -> Self {
        let mut parts = match self {
            FieldConstraint::And(parts) => parts,
            existing => vec![existing],
        };
        match incoming {
            FieldConstraint::And(more) => parts.extend(more),
            c => parts.push(c),
        }
        FieldConstraint::And(parts)
    }

    pub fn to_bson(&self) -> Bson {
        match self {
            FieldConstraint::Literal(value) => value.clone(),
            FieldConstraint::Ne(value) => Bson::Document(doc! { "$ne": value.clone() }),
            FieldConstraint::Not(inner) => Bson::Document(doc! { "$not": inner.to_bson() }),
            FieldConstraint::And(parts) => {
                let parts: Vec<Bson> = parts.iter().map(FieldConstraint::to_bson).collect();
                Bson::Document(doc! { "$and": parts })
            }
        }
    }
}

/// A filter under construction: per-field constraints, ANDed, plus at most
/// one OR-group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterDocument {
    fields: Vec<(String, FieldConstraint)>,
    or: Option<Vec<FilterDocument>>,
}

impl FilterDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, constraint: FieldConstraint) -> Self {
        Self {
            fields: vec![(field.into(), constraint)],
            or: None,
        }
    }

    /// A document holding only an OR-group.
    pub fn any(branches: Vec<FilterDocument>) -> Self {
        Self {
            fields: Vec::new(),
            or: Some(branches),
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldConstraint> {
        self.fields.iter().find(|(f, _)| f == field).map(|(_, c)| c)
    }

    pub fn fields(&self) -> &[(String, FieldConstraint)] {
        &self.fields
    }

    pub fn or_group(&self) -> Option<&[FilterDocument]> {
        self.or.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.or.is_none()
    }

    pub(crate) fn from_parts(
        fields: Vec<(String, FieldConstraint)>,
        or: Option<Vec<FilterDocument>>,
    ) -> Self {
        Self { fields, or }
    }

    pub(crate) fn into_parts(self) -> (Vec<(String, FieldConstraint)>, Option<Vec<FilterDocument>>) {
        (self.fields, self.or)
    }

    /// AND a constraint onto `field`. A field seen before keeps both.
    pub fn and_constraint(&mut self, field: String, constraint: FieldConstraint) {
        match self.fields.iter_mut().find(|(f, _)| *f == field) {
            Some((_, existing)) => {
                let prev = std::mem::replace(existing, FieldConstraint::And(Vec::new()));
                *existing = prev.and(constraint);
            }
            None => self.fields.push((field, constraint)),
        }
    }

    /// AND another compiled filter into this one.
    pub fn merge(&mut self, other: FilterDocument) -> Result<(), CompileError> {
        let (fields, or) = other.into_parts();
        if let Some(branches) = or {
            if self.or.is_some() {
                return Err(CompileError::shape("only one OR-group supported"));
            }
            self.or = Some(branches);
        }
        for (field, constraint) in fields {
            self.and_constraint(field, constraint);
        }
        Ok(())
    }

    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        for (field, constraint) in &self.fields {
            doc.insert(field.clone(), constraint.to_bson());
        }
        if let Some(branches) = &self.or {
            let branches: Vec<Bson> = branches
                .iter()
                .map(|b| Bson::Document(b.to_document()))
                .collect();
            doc.insert("$or", branches);
        }
        doc
    }
}
