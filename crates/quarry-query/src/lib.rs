mod field;
mod lookup;
mod model;
mod node;
mod query;

pub use field::{ColumnRef, FieldKind, FieldRef, Lhs, PrepareError, ResolveField, ResolvedField};
pub use lookup::Lookup;
pub use model::{ColumnSpec, Model, RowDescriptor};
pub use node::{Atom, Connector, WhereGroup, WhereNode};
pub use query::{
    Aggregate, AggregateTarget, InsertQuery, SelectQuery, TableAlias, UpdateQuery, WriteIntent,
};
