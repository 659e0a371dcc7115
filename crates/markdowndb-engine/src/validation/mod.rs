//! # Schema Validation
//!
//! Validates a [`ParsedDocument`](crate::parsing::ParsedDocument) against a
//! data-only [`Schema`] and produces a [`ValidationReport`].
//!
//! Three severities: errors block, warnings nag, info observes. Unknown
//! fields and sections are always legal and only ever appear as info.
//! Findings that can be repaired mechanically carry a [`Fix`] for the
//! editing module to apply.

pub mod schema;
pub mod types;
pub mod validator;

pub use schema::{Schema, SchemaError, SectionRule};
pub use types::{Finding, FindingKind, Fix, Severity, ValidationReport};
pub use validator::validate;
