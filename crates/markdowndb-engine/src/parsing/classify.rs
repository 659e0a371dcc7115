use std::sync::OnceLock;

use regex::Regex;

use super::rope::{LineRef, Span};

/// Line-comment marker, valid as a whole-line prefix or as a trailing comment.
pub const COMMENT_MARKER: &str = "//";

/// What a single source line is, with its extracted payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Blank, whitespace-only, or a whole-line comment.
    Skip,
    /// `<IDENT>`
    TypeOpen(String),
    /// `</IDENT>`; the identifier is not kept.
    TypeClose,
    /// `# LABEL` with the label as written (not normalized).
    SectionHeader(String),
    /// `- TEXT`
    ListItem(String),
    /// `KEY: VALUE` with any trailing comment removed from the value.
    KeyValue { key: String, value: String },
    Unrecognized,
}

/// Classification of a single line plus where its pieces live in the rope.
#[derive(Debug, Clone)]
pub struct LineClass {
    /// Full byte span of this line in the rope, newline included.
    pub line: Span,
    pub kind: LineKind,
    /// For key/value lines, the span of the trimmed value text. Leading
    /// whitespace and any trailing comment sit outside it.
    pub value_span: Option<Span>,
    /// Whether the line is whitespace only. Comment lines are `Skip` but not blank.
    pub is_blank: bool,
    /// Whether the line ends with a line terminator. Only the last line may not.
    pub has_newline: bool,
}

/// Classifies individual lines. Holds no state; every line is judged alone.
pub struct LineClassifier;

impl LineClassifier {
    /// Classifies a rope line into a [`LineClass`] with absolute spans.
    pub fn classify(&self, lr: &LineRef) -> LineClass {
        let (kind, value) = classify_parts(&lr.text);
        LineClass {
            line: lr.span,
            kind,
            value_span: value.map(|v| Span::new(lr.span.start + v.start, lr.span.start + v.end)),
            is_blank: lr.text.trim().is_empty(),
            has_newline: lr.has_newline(),
        }
    }
}

/// Classifies one source line. The line may still carry its newline.
pub fn classify_line(line: &str) -> LineKind {
    classify_parts(line).0
}

/// Byte offset of a trailing comment in `s`, if any.
///
/// The marker only counts at the start or after whitespace, so values such
/// as `https://example.com` survive intact.
pub fn comment_start(s: &str) -> Option<usize> {
    s.match_indices(COMMENT_MARKER)
        .map(|(i, _)| i)
        .find(|&i| i == 0 || s[..i].ends_with(char::is_whitespace))
}

fn type_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^<([A-Z_]+)>$").expect("Invalid type-open regex"))
}

fn type_close_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^</([A-Z_]+)>$").expect("Invalid type-close regex"))
}

fn section_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^#\s+([A-Z][A-Z0-9_]*(?:[ \t]+[A-Z][A-Z0-9_]*)*)(?:\s*|\s+//.*)$")
            .expect("Invalid section regex")
    })
}

fn list_item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-\s+(.+)$").expect("Invalid list item regex"))
}

fn key_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*):(.*)$").expect("Invalid key/value regex")
    })
}

/// Returns the kind and, for key/values, the value range relative to `line`.
fn classify_parts(line: &str) -> (LineKind, Option<std::ops::Range<usize>>) {
    let content = line.trim_end_matches(['\r', '\n']);
    let lead = content.len() - content.trim_start().len();
    let trimmed = content.trim();

    if trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKER) {
        return (LineKind::Skip, None);
    }

    if type_close_re().is_match(trimmed) {
        return (LineKind::TypeClose, None);
    }

    if let Some(caps) = type_open_re().captures(trimmed) {
        return (LineKind::TypeOpen(caps[1].to_string()), None);
    }

    if let Some(caps) = section_re().captures(trimmed) {
        return (LineKind::SectionHeader(caps[1].to_string()), None);
    }

    if let Some(caps) = list_item_re().captures(trimmed) {
        return (LineKind::ListItem(caps[1].trim().to_string()), None);
    }

    if let Some(caps) = key_value_re().captures(trimmed) {
        let raw = caps.get(2).map_or("", |m| m.as_str());
        let raw_start = lead + caps.get(2).map_or(trimmed.len(), |m| m.start());

        let uncommented = &raw[..comment_start(raw).unwrap_or(raw.len())];
        let skipped = uncommented.len() - uncommented.trim_start().len();
        let value = uncommented.trim();
        let start = raw_start + skipped;

        return (
            LineKind::KeyValue {
                key: caps[1].to_string(),
                value: value.to_string(),
            },
            Some(start..start + value.len()),
        );
    }

    (LineKind::Unrecognized, None)
}
