use bson::Bson;
use quarry_query::{Atom, Lookup, Model, ResolveField};

use crate::constraint::{FieldConstraint, ID_FIELD};
use crate::error::CompileError;

/// Translate one leaf predicate into a `(field, constraint)` pair.
///
/// Only `exact` and `isnull` have a store-native form. For `isnull` the
/// constraint is `Not(null)` exactly when the annotation (IS NOT NULL) and
/// `negated` disagree.
pub fn translate_atom(
    atom: &Atom,
    negated: bool,
    model: &Model,
) -> Result<(String, FieldConstraint), CompileError> {
    if !matches!(atom.lookup, Lookup::Exact | Lookup::IsNull) {
        return Err(CompileError::UnsupportedLookup(atom.lookup.as_str().to_string()));
    }

    let resolved = atom.lhs.resolve(atom.lookup, &atom.value)?;
    if resolved.column.table != model.db_table {
        return Err(CompileError::shape(format!(
            "join: reference to {}.{} from {}",
            resolved.column.table, resolved.column.column, model.db_table
        )));
    }

    let field = if model.is_pk(&resolved.column.column) {
        ID_FIELD.to_string()
    } else {
        resolved.column.column
    };

    let constraint = match atom.lookup {
        Lookup::Exact if negated => FieldConstraint::Ne(resolved.value),
        Lookup::Exact => FieldConstraint::Literal(resolved.value),
        _ if atom.annotation != negated => FieldConstraint::not(FieldConstraint::Literal(Bson::Null)),
        _ => FieldConstraint::Literal(Bson::Null),
    };
    Ok((field, constraint))
}
