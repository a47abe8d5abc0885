use std::cmp::Ordering;

use bson::{Bson, Document};

use crate::filter::{Condition, Expression};

/// Evaluate whether a document matches the given expression.
pub fn matches(doc: &Document, expr: &Expression) -> bool {
    match expr {
        Expression::And(children) => children.iter().all(|c| matches(doc, c)),
        Expression::Or(children) => children.iter().any(|c| matches(doc, c)),
        Expression::Field(field, cond) => check(get_path(doc, field), cond),
    }
}

/// Resolve a dotted path against a document.
fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Bson::Document(sub) => sub.get(part)?,
            _ => return None,
        };
    }
    Some(current)
}

fn check(value: Option<&Bson>, cond: &Condition) -> bool {
    match cond {
        Condition::Eq(expected) => field_eq(value, expected),
        Condition::Ne(expected) => !field_eq(value, expected),
        Condition::Gt(v) => field_cmp(value, v, |o| o == Ordering::Greater),
        Condition::Gte(v) => field_cmp(value, v, |o| o != Ordering::Less),
        Condition::Lt(v) => field_cmp(value, v, |o| o == Ordering::Less),
        Condition::Lte(v) => field_cmp(value, v, |o| o != Ordering::Greater),
        // $exists checks physical presence: a null value still exists
        Condition::Exists(expected) => value.is_some() == *expected,
        Condition::Not(inner) => !check(value, inner),
        Condition::All(conds) => conds.iter().all(|c| check(value, c)),
    }
}

fn field_eq(value: Option<&Bson>, expected: &Bson) -> bool {
    match (value, expected) {
        // $eq: null matches both missing fields and explicit null values
        (None, Bson::Null) => true,
        (None, _) => false,
        (Some(Bson::Array(arr)), _) if !matches!(expected, Bson::Array(_)) => {
            arr.iter().any(|elem| value_eq(elem, expected))
        }
        (Some(v), _) => value_eq(v, expected),
    }
}

fn field_cmp(value: Option<&Bson>, expected: &Bson, predicate: fn(Ordering) -> bool) -> bool {
    match value {
        Some(Bson::Array(arr)) => arr
            .iter()
            .any(|elem| value_cmp(elem, expected).is_some_and(predicate)),
        Some(v) => value_cmp(v, expected).is_some_and(predicate),
        None => false,
    }
}

/// Equality between a stored value and a query value. Numbers compare across
/// widths; other types must match exactly.
pub(crate) fn value_eq(stored: &Bson, query: &Bson) -> bool {
    match (as_f64(stored), as_f64(query)) {
        (Some(a), Some(b)) => match (stored, query) {
            (Bson::Int32(_) | Bson::Int64(_), Bson::Int32(_) | Bson::Int64(_)) => {
                as_i64(stored) == as_i64(query)
            }
            _ => a == b,
        },
        _ => stored == query,
    }
}

/// Ordering between a stored value and a query value; `None` for
/// incompatible types, which never match a range condition.
fn value_cmp(stored: &Bson, query: &Bson) -> Option<Ordering> {
    match (stored, query) {
        (Bson::Int32(_) | Bson::Int64(_), Bson::Int32(_) | Bson::Int64(_)) => {
            Some(as_i64(stored)?.cmp(&as_i64(query)?))
        }
        (Bson::String(a), Bson::String(b)) => Some(a.cmp(b)),
        (Bson::DateTime(a), Bson::DateTime(b)) => {
            Some(a.timestamp_millis().cmp(&b.timestamp_millis()))
        }
        (Bson::Boolean(a), Bson::Boolean(b)) => Some(a.cmp(b)),
        (Bson::ObjectId(a), Bson::ObjectId(b)) => Some(a.bytes().cmp(&b.bytes())),
        _ => as_f64(stored)?.partial_cmp(&as_f64(query)?),
    }
}

fn as_i64(v: &Bson) -> Option<i64> {
    match v {
        Bson::Int32(i) => Some(*i as i64),
        Bson::Int64(i) => Some(*i),
        _ => None,
    }
}

fn as_f64(v: &Bson) -> Option<f64> {
    match v {
        Bson::Int32(i) => Some(*i as f64),
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(d) => Some(*d),
        _ => None,
    }
}
