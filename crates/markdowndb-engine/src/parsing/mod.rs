//! # Document Parsing
//!
//! Two-phase, line-oriented parsing of MarkdownDB text.
//!
//! 1. **Line Classification** (`classify`): each line is classified alone into
//!    a [`LineKind`] (type tag, section header, list item, key/value, ...).
//! 2. **Document Construction** (`builder`): a [`DocumentBuilder`] walks the
//!    classified lines once, tracking only the open section, and produces a
//!    [`ParsedDocument`].
//!
//! Parsing is total. Text with no recognizable structure yields an empty
//! document; unknown syntax is skipped. Reporting "malformed" is the
//! validator's job.

pub mod builder;
pub mod classify;
pub mod rope;
pub mod types;

#[cfg(test)]
mod tests;

use xi_rope::Rope;

pub use builder::DocumentBuilder;
pub use classify::{COMMENT_MARKER, LineClass, LineClassifier, LineKind, classify_line};
pub use types::{ParsedDocument, Section, normalize_label};

use rope::lines_with_spans;

/// Parses raw text into a [`ParsedDocument`]. Never fails.
pub fn parse(text: &str) -> ParsedDocument {
    parse_rope(&Rope::from(text))
}

pub fn parse_rope(rope: &Rope) -> ParsedDocument {
    let mut builder = DocumentBuilder::new();
    for class in classified_lines(rope) {
        builder.push(&class.kind);
    }
    builder.finish()
}

/// Classifies every line of the rope, keeping absolute spans.
pub fn classified_lines(rope: &Rope) -> impl Iterator<Item = LineClass> + '_ {
    let classifier = LineClassifier;
    lines_with_spans(rope).map(move |lr| classifier.classify(&lr))
}
