//! Compiles relational query descriptions into document-store calls.
//!
//! WHERE trees become filter documents built only from `$ne`, `$not`,
//! field-level `$and` and a single top-level `$or`; inserts and updates become
//! store-native write documents; result documents are decoded back into
//! positional rows.

mod atom;
mod constraint;
mod decode;
mod error;
mod filters;
mod insert;
mod select;
mod update;

pub use atom::translate_atom;
pub use constraint::{FieldConstraint, FilterDocument, ID_FIELD};
pub use decode::{RowDecoder, Rows};
pub use error::CompileError;
pub use filters::compile_filters;
pub use insert::InsertCompiler;
pub use select::SelectCompiler;
pub use update::UpdateCompiler;
