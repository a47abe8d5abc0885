use quarry_query::{Connector, Model, WhereGroup, WhereNode};

use crate::atom::translate_atom;
use crate::constraint::{FieldConstraint, FilterDocument};
use crate::error::CompileError;

/// Compile a WHERE tree into a filter document using only store-native
/// operators.
///
/// The root must be a non-negated AND group. Negated sub-groups are rewritten
/// with De Morgan's laws, which may introduce a single top-level `$or`.
pub fn compile_filters(where_: &WhereGroup, model: &Model) -> Result<FilterDocument, CompileError> {
    if where_.negated {
        return Err(CompileError::shape("negated top-level condition"));
    }
    compile_group(where_, model)
}

fn compile_group(group: &WhereGroup, model: &Model) -> Result<FilterDocument, CompileError> {
    if group.connector != Connector::And {
        return Err(CompileError::shape(format!("{} connector", group.connector.as_str())));
    }

    let mut filters = FilterDocument::new();
    for child in &group.children {
        match child {
            WhereNode::Group(sub) => {
                let mut sub_filters = compile_group(sub, model)?;
                // must happen before merging: afterwards the sub-group's
                // entries can no longer be told apart from ours
                if sub.negated {
                    sub_filters = negate_filters(sub_filters)?;
                }
                filters.merge(sub_filters)?;
            }
            WhereNode::Atom(atom) => {
                let (field, constraint) = translate_atom(atom, atom.negated, model)?;
                filters.and_constraint(field, constraint);
            }
        }
    }
    Ok(filters)
}

/// NOT over a compiled conjunction.
///
/// `NOT(e1 AND e2 ...)` becomes `(NOT e1) OR (NOT e2) ...`. A field holding
/// `And(c1, c2)` contributes one disjunct per part, and an OR-group entry
/// contributes the conjunction of its negated branches. A single disjunct is
/// returned as-is.
pub(crate) fn negate_filters(filters: FilterDocument) -> Result<FilterDocument, CompileError> {
    if filters.is_empty() {
        return Err(CompileError::shape("negation of an empty condition"));
    }

    let (fields, or) = filters.into_parts();
    let mut terms: Vec<FilterDocument> = Vec::new();

    for (field, constraint) in fields {
        match constraint {
            FieldConstraint::And(parts) => terms.extend(
                parts
                    .into_iter()
                    .map(|part| FilterDocument::single(field.clone(), part.negate())),
            ),
            c => terms.push(FilterDocument::single(field, c.negate())),
        }
    }

    if let Some(branches) = or {
        let mut all = FilterDocument::new();
        for branch in branches {
            all.merge(negate_filters(branch)?)?;
        }
        terms.push(all);
    }

    if terms.len() == 1 {
        return Ok(terms.remove(0));
    }

    // (a OR b) OR c == a OR b OR c
    let mut flat = Vec::with_capacity(terms.len());
    for term in terms {
        match term.into_parts() {
            (fields, Some(branches)) if fields.is_empty() => flat.extend(branches),
            (fields, or) => flat.push(FilterDocument::from_parts(fields, or)),
        }
    }
    Ok(FilterDocument::any(flat))
}
