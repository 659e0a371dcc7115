use std::ops::Range;

use crate::parsing::rope::Span;

/// Result of applying a fix to a raw document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// The full new text. Equal to the input when nothing changed.
    pub text: String,
    /// The caller's cursor, remapped through the edit.
    pub cursor: usize,
    /// Byte range of the new text that was written, `None` for a no-op.
    pub changed: Option<Range<usize>>,
}

impl Patch {
    /// A patch that leaves text and cursor exactly as they were.
    pub fn unchanged(text: &str, cursor: usize) -> Self {
        Self {
            text: text.to_string(),
            cursor,
            changed: None,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.changed.is_none()
    }
}

/// Maps a cursor offset through the replacement of `replaced` by
/// `inserted_len` bytes.
///
/// - Pure insertion: offsets at or after the insertion point shift right.
/// - Otherwise: offsets up to the span start stay, offsets inside collapse to
///   the span start, offsets at or past the span end shift by the length
///   difference.
pub fn remap_cursor(cursor: usize, replaced: Span, inserted_len: usize) -> usize {
    if replaced.is_empty() {
        return if cursor >= replaced.start {
            cursor + inserted_len
        } else {
            cursor
        };
    }

    if cursor <= replaced.start {
        cursor
    } else if cursor < replaced.end {
        replaced.start
    } else {
        cursor - replaced.len() + inserted_len
    }
}
