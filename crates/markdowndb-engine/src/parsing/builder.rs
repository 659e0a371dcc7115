use super::{
    classify::LineKind,
    types::{ParsedDocument, Section, normalize_label},
};

/// Single forward pass over classified lines.
///
/// The only state carried between lines is the currently open section.
pub struct DocumentBuilder {
    current_section: Option<String>,
    doc: ParsedDocument,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self {
            current_section: None,
            doc: ParsedDocument::default(),
        }
    }

    pub fn push(&mut self, kind: &LineKind) {
        match kind {
            LineKind::Skip | LineKind::TypeClose | LineKind::Unrecognized => {}
            LineKind::TypeOpen(tag) => {
                // First tag wins; later tags are ignored.
                if self.doc.entity_type.is_none() {
                    self.doc.entity_type = Some(tag.clone());
                }
            }
            LineKind::SectionHeader(label) => self.open_section(normalize_label(label)),
            LineKind::ListItem(text) => {
                // Items before any header have nowhere to go and are dropped.
                if let Some(section) = self.current_mut() {
                    section.items.push(text.clone());
                }
            }
            LineKind::KeyValue { key, value } => match self.current_mut() {
                Some(section) => {
                    section
                        .fields
                        .get_or_insert_with(Default::default)
                        .insert(key.clone(), value.clone());
                }
                None => {
                    self.doc.top_level_fields.insert(key.clone(), value.clone());
                }
            },
        }
    }

    pub fn finish(self) -> ParsedDocument {
        self.doc
    }

    /// Re-opening a label replaces the earlier section and moves it to the end.
    fn open_section(&mut self, label: String) {
        self.doc.sections.shift_remove(&label);
        self.doc.sections.insert(label.clone(), Section::default());
        self.current_section = Some(label);
    }

    fn current_mut(&mut self) -> Option<&mut Section> {
        let label = self.current_section.as_ref()?;
        self.doc.sections.get_mut(label)
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
