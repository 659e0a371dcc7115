pub mod catalog;
pub mod entity_kind;

pub use catalog::Catalog;
pub use entity_kind::{EntityKind, SchemaSet, UnknownKind, template_for};
