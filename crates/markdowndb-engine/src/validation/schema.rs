use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::parsing::normalize_label;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Failed to parse schema: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Schema has an empty entity_type")]
    MissingEntityType,
}

/// Rule for one known section. All sections in scope hold list items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRule {
    #[serde(default)]
    pub required: bool,
}

/// Static, per-entity-kind validation rules.
///
/// A schema only says what must exist. Anything it does not mention is legal
/// and surfaces as a custom field or section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Tag expected in the type-open line, e.g. `JOB`.
    pub entity_type: String,
    #[serde(default)]
    pub required_top_level_fields: IndexSet<String>,
    /// Optional fields that are recognized and so not reported as custom.
    #[serde(default)]
    pub known_fields: IndexSet<String>,
    /// Known sections keyed by normalized label.
    #[serde(default)]
    pub sections: IndexMap<String, SectionRule>,
    /// Fields restricted to a fixed set of values. Empty when absent.
    #[serde(default)]
    pub enumerated_fields: IndexMap<String, IndexSet<String>>,
}

impl Schema {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            required_top_level_fields: IndexSet::new(),
            known_fields: IndexSet::new(),
            sections: IndexMap::new(),
            enumerated_fields: IndexMap::new(),
        }
    }

    pub fn require_field(mut self, name: &str) -> Self {
        self.required_top_level_fields.insert(name.to_string());
        self
    }

    pub fn field(mut self, name: &str) -> Self {
        self.known_fields.insert(name.to_string());
        self
    }

    pub fn section(mut self, label: &str, required: bool) -> Self {
        self.sections
            .insert(normalize_label(label), SectionRule { required });
        self
    }

    pub fn enumerated(mut self, name: &str, values: &[&str]) -> Self {
        self.enumerated_fields.insert(
            name.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    /// Loads a schema from TOML. Section labels are normalized on the way in.
    ///
    /// ```toml
    /// entity_type = "JOB"
    /// required_top_level_fields = ["TITLE"]
    ///
    /// [sections.REQUIRED_SKILLS]
    /// required = true
    ///
    /// [enumerated_fields]
    /// REMOTE_TYPE = ["REMOTE", "HYBRID", "ONSITE"]
    /// ```
    pub fn from_toml_str(s: &str) -> Result<Self, SchemaError> {
        let mut schema: Schema = toml::from_str(s)?;
        if schema.entity_type.trim().is_empty() {
            return Err(SchemaError::MissingEntityType);
        }
        schema.sections = schema
            .sections
            .into_iter()
            .map(|(label, rule)| (normalize_label(&label), rule))
            .collect();
        Ok(schema)
    }

    /// Whether a top-level field is mentioned anywhere in the schema.
    pub fn is_known_field(&self, name: &str) -> bool {
        self.required_top_level_fields.contains(name)
            || self.known_fields.contains(name)
            || self.enumerated_fields.contains_key(name)
    }

    pub fn is_known_section(&self, label: &str) -> bool {
        self.sections.contains_key(&normalize_label(label))
    }

    pub fn allowed_values(&self, field: &str) -> Option<&IndexSet<String>> {
        self.enumerated_fields.get(field)
    }

    /// The built-in schema for job postings.
    pub fn job() -> Self {
        Schema::new("JOB")
            .require_field("TITLE")
            .require_field("COMPANY")
            .field("LOCATION")
            .field("SALARY_MIN")
            .field("SALARY_MAX")
            .field("CURRENCY")
            .field("URL")
            .field("POSTED_DATE")
            .field("STATUS")
            .enumerated("REMOTE_TYPE", &["REMOTE", "HYBRID", "ONSITE"])
            .enumerated(
                "EMPLOYMENT_TYPE",
                &["FULL_TIME", "PART_TIME", "CONTRACT", "INTERNSHIP", "FREELANCE"],
            )
            .enumerated(
                "EXPERIENCE_LEVEL",
                &["ENTRY", "MID", "SENIOR", "LEAD", "EXECUTIVE"],
            )
            .enumerated(
                "PAY_PERIOD",
                &["HOURLY", "DAILY", "WEEKLY", "MONTHLY", "YEARLY"],
            )
            .section("REQUIRED_SKILLS", true)
            .section("PREFERRED_SKILLS", false)
            .section("RESPONSIBILITIES", false)
            .section("BENEFITS", false)
            .section("NOTES", false)
    }

    /// The built-in schema for a person's profile.
    pub fn profile() -> Self {
        Schema::new("PROFILE")
            .require_field("NAME")
            .field("EMAIL")
            .field("PHONE")
            .field("LOCATION")
            .field("HEADLINE")
            .field("LINKEDIN")
            .field("GITHUB")
            .field("WEBSITE")
            .section("SUMMARY", false)
            .section("EXPERIENCE", false)
            .section("EDUCATION", false)
            .section("SKILLS", false)
            .section("PROJECTS", false)
            .section("CERTIFICATIONS", false)
            .section("LANGUAGES", false)
    }
}
