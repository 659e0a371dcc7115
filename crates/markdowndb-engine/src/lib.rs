pub mod cache;
pub mod editing;
pub mod io;
pub mod models;
pub mod parsing;
pub mod validation;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use cache::{CacheStats, ParseCache, SharedParseCache};
pub use editing::{FixError, Patch, apply_fix, try_apply_fix};
pub use io::{DocumentStore, FileStore, MemoryStore, StoreError};
pub use models::{Catalog, EntityKind, SchemaSet};
pub use parsing::{ParsedDocument, Section, parse};
pub use validation::{Finding, FindingKind, Fix, Schema, Severity, ValidationReport, validate};
