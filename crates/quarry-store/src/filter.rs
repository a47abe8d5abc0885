use bson::{Bson, Document};

use crate::error::StoreError;

/// A parsed filter document.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    And(Vec<Expression>),
    Or(Vec<Expression>),
    Field(String, Condition),
}

/// Constraint on a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(Bson),
    Ne(Bson),
    Gt(Bson),
    Gte(Bson),
    Lt(Bson),
    Lte(Bson),
    Exists(bool),
    Not(Box<Condition>),
    All(Vec<Condition>),
}

/// Parse a filter document into an [`Expression`].
///
/// Follows MongoDB query semantics:
/// - the top-level document is an implicit AND of its entries, and an empty
///   document matches everything
/// - `{ "field": value }` is implicit `$eq`
/// - `{ "field": { "$ne": v } }` uses operator sub-documents
/// - `{ "field": { "$not": c } }` negates `c`, which may be a bare value
/// - `{ "field": { "$and": [c1, c2] } }` requires every condition
/// - `{ "$or": [...] }` / `{ "$and": [...] }` for explicit logical ops
pub fn parse_filter(doc: &Document) -> Result<Expression, StoreError> {
    let mut children = Vec::with_capacity(doc.len());

    for (key, value) in doc {
        match key.as_str() {
            "$and" => children.push(Expression::And(parse_logical_array(value)?)),
            "$or" => children.push(Expression::Or(parse_logical_array(value)?)),
            k if k.starts_with('$') => {
                return Err(invalid(format!("unknown top-level operator: {k}")));
            }
            _ => children.push(Expression::Field(key.clone(), parse_condition(value)?)),
        }
    }

    if children.len() == 1 {
        Ok(children.remove(0))
    } else {
        Ok(Expression::And(children))
    }
}

fn invalid(msg: String) -> StoreError {
    StoreError::InvalidFilter(msg)
}

fn parse_logical_array(value: &Bson) -> Result<Vec<Expression>, StoreError> {
    let arr = match value {
        Bson::Array(a) => a,
        _ => return Err(invalid("$and/$or value must be an array".into())),
    };
    if arr.is_empty() {
        return Err(invalid("$and/$or array must not be empty".into()));
    }

    arr.iter()
        .map(|elem| match elem {
            Bson::Document(sub) => parse_filter(sub),
            _ => Err(invalid("$and/$or array elements must be documents".into())),
        })
        .collect()
}

fn is_operator_doc(doc: &Document) -> bool {
    doc.keys().next().is_some_and(|k| k.starts_with('$'))
}

/// A field value: either an operator document or an implicit `$eq` value.
fn parse_condition(value: &Bson) -> Result<Condition, StoreError> {
    match value {
        Bson::Document(sub) if is_operator_doc(sub) => parse_operator_doc(sub),
        _ => Ok(Condition::Eq(value.clone())),
    }
}

fn parse_operator_doc(doc: &Document) -> Result<Condition, StoreError> {
    let mut conditions = Vec::with_capacity(doc.len());

    for (op, value) in doc {
        let cond = match op.as_str() {
            "$eq" => Condition::Eq(value.clone()),
            "$ne" => Condition::Ne(value.clone()),
            "$gt" => Condition::Gt(value.clone()),
            "$gte" => Condition::Gte(value.clone()),
            "$lt" => Condition::Lt(value.clone()),
            "$lte" => Condition::Lte(value.clone()),
            "$exists" => match value {
                Bson::Boolean(b) => Condition::Exists(*b),
                _ => return Err(invalid("$exists value must be a boolean".into())),
            },
            "$not" => Condition::Not(Box::new(parse_condition(value)?)),
            "$and" => match value {
                Bson::Array(arr) if !arr.is_empty() => {
                    Condition::All(arr.iter().map(parse_condition).collect::<Result<_, _>>()?)
                }
                _ => return Err(invalid("field-level $and must be a non-empty array".into())),
            },
            k => return Err(invalid(format!("unknown field operator: {k}"))),
        };
        conditions.push(cond);
    }

    match conditions.len() {
        1 => Ok(conditions.remove(0)),
        _ => Ok(Condition::All(conditions)),
    }
}
