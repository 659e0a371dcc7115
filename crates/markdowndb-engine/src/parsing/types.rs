use indexmap::IndexMap;
use serde::Serialize;

/// A named group of list items, with the occasional key/value pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Section {
    /// List entries in source order.
    pub items: Vec<String>,
    /// Key/value pairs written inside the section. `None` until one appears.
    pub fields: Option<IndexMap<String, String>>,
}

impl Section {
    /// A section with no list items. Nested fields do not count as content.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The structured read-model of a raw document.
///
/// A pure function of the text it came from. It is never persisted and never
/// edited directly; changes go through the raw text and a fresh parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedDocument {
    /// Identifier from the first type-open tag, e.g. `JOB`.
    pub entity_type: Option<String>,
    /// Key/value pairs written before any section header.
    pub top_level_fields: IndexMap<String, String>,
    /// Sections keyed by their normalized label.
    pub sections: IndexMap<String, Section>,
}

impl ParsedDocument {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.top_level_fields.get(name).map(String::as_str)
    }

    /// Looks a section up by either spelling of its label.
    pub fn section(&self, label: &str) -> Option<&Section> {
        self.sections.get(&normalize_label(label))
    }

    /// True when no structure at all was recognized.
    pub fn is_empty(&self) -> bool {
        self.entity_type.is_none() && self.top_level_fields.is_empty() && self.sections.is_empty()
    }
}

/// Canonical form of a section label: words joined by single underscores.
///
/// `REQUIRED SKILLS`, `REQUIRED_SKILLS` and `REQUIRED  SKILLS` all map to
/// `REQUIRED_SKILLS`.
pub fn normalize_label(label: &str) -> String {
    label
        .split(|c: char| c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}
