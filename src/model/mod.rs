//! Constraint model shared by every engine adapter.
//!
//! The model is pure structure: it names fields, their kinds and bounds, and
//! how objects nest. It carries no validation logic. Nested objects point at
//! other schemas through a late-bound `SchemaRef`, which lets a schema refer
//! to itself (a person whose best friend is another person) without building
//! an infinite value.

pub mod constraint;
pub mod schema;

pub use constraint::{FieldConstraint, FieldKind, Format, ItemConstraint, SchemaId, SchemaRef};
pub use schema::{ObjectSchema, SchemaCatalog, define_schema};
