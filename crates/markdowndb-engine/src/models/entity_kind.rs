use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::parsing::ParsedDocument;
use crate::validation::Schema;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown entity kind {0:?}; expected job or profile")]
pub struct UnknownKind(pub String);

/// The two kinds of document the engine ships schemas for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Job,
    Profile,
}

impl EntityKind {
    pub const ALL: [EntityKind; 2] = [EntityKind::Job, EntityKind::Profile];

    /// Identifier used in the type-open tag.
    pub fn tag(self) -> &'static str {
        match self {
            EntityKind::Job => "JOB",
            EntityKind::Profile => "PROFILE",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// The kind declared by a parsed document's type tag, if recognized.
    pub fn detect(doc: &ParsedDocument) -> Option<Self> {
        doc.entity_type.as_deref().and_then(Self::from_tag)
    }

    /// The built-in schema for this kind.
    pub fn schema(self) -> Schema {
        match self {
            EntityKind::Job => Schema::job(),
            EntityKind::Profile => Schema::profile(),
        }
    }

    /// Seed text for a new entry of this kind.
    pub fn template(self) -> String {
        template_for(&self.schema())
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Job => f.write_str("job"),
            EntityKind::Profile => f.write_str("profile"),
        }
    }
}

impl FromStr for EntityKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "job" => Ok(EntityKind::Job),
            "profile" => Ok(EntityKind::Profile),
            _ => Err(UnknownKind(s.to_string())),
        }
    }
}

/// Blank document skeleton for a schema.
///
/// Required fields come first with empty values, then enumerated fields with
/// their allowed values as a trailing comment, then one header per section.
pub fn template_for(schema: &Schema) -> String {
    let mut out = format!("<{}>\n", schema.entity_type);

    for name in &schema.required_top_level_fields {
        out.push_str(&format!("{name}: \n"));
    }
    for (name, allowed) in &schema.enumerated_fields {
        let choices = allowed.iter().cloned().collect::<Vec<_>>().join(" | ");
        out.push_str(&format!("{name}: // {choices}\n"));
    }

    for label in schema.sections.keys() {
        out.push_str(&format!("\n# {label}\n"));
    }

    out.push_str(&format!("</{}>\n", schema.entity_type));
    out
}

/// One schema per entity kind; the built-ins unless replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSet {
    pub job: Schema,
    pub profile: Schema,
}

impl SchemaSet {
    pub fn get(&self, kind: EntityKind) -> &Schema {
        match kind {
            EntityKind::Job => &self.job,
            EntityKind::Profile => &self.profile,
        }
    }

    pub fn set(&mut self, kind: EntityKind, schema: Schema) {
        match kind {
            EntityKind::Job => self.job = schema,
            EntityKind::Profile => self.profile = schema,
        }
    }
}

impl Default for SchemaSet {
    fn default() -> Self {
        Self {
            job: Schema::job(),
            profile: Schema::profile(),
        }
    }
}
