//! The catalog data model: fields, cubes, joins and queries (spec §3).

mod cube;
mod field;
mod query;

pub use cube::{Cube, CubeCatalog, Join, JoinType};
pub use field::{scalar_to_string, FieldDecl, FieldKind, VariantSpec, VariantValue};
pub use query::Query;
