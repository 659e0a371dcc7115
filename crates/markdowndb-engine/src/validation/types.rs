use serde::{Deserialize, Serialize};

/// How much a finding matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks the entity from being considered well-formed.
    Error,
    /// Should be fixed, but does not block.
    Warning,
    /// Observational only.
    Info,
}

/// What a finding is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    MissingType,
    TypeMismatch,
    MissingRequiredField,
    MissingRequiredSection,
    EmptySection,
    InvalidEnumValue,
    CustomField,
    CustomSection,
}

impl FindingKind {
    /// Stable machine-readable code, e.g. `missing_required_field`.
    pub fn code(self) -> &'static str {
        match self {
            FindingKind::MissingType => "missing_type",
            FindingKind::TypeMismatch => "type_mismatch",
            FindingKind::MissingRequiredField => "missing_required_field",
            FindingKind::MissingRequiredSection => "missing_required_section",
            FindingKind::EmptySection => "empty_section",
            FindingKind::InvalidEnumValue => "invalid_enum_value",
            FindingKind::CustomField => "custom_field",
            FindingKind::CustomSection => "custom_section",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            FindingKind::MissingType
            | FindingKind::MissingRequiredField
            | FindingKind::MissingRequiredSection => Severity::Error,
            FindingKind::TypeMismatch
            | FindingKind::EmptySection
            | FindingKind::InvalidEnumValue => Severity::Warning,
            FindingKind::CustomField | FindingKind::CustomSection => Severity::Info,
        }
    }
}

impl std::fmt::Display for FindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A structured description of a text change that resolves one finding.
///
/// Carries everything the fix engine needs; it never re-derives the change
/// from a parsed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Fix {
    /// Remove a section header and everything up to the next header.
    DeleteSection { name: String },
    /// Add a `NAME: value` line after the last top-level field.
    InsertField { name: String, value: String },
    /// Replace the value of an enumerated field.
    ReplaceEnumValue { field: String, value: String },
    /// Replace the value of an enumerated field with one of several choices.
    /// Resolve it with [`Fix::choose`] before applying.
    ReplaceEnumValueMulti {
        field: String,
        allowed_values: Vec<String>,
    },
}

impl Fix {
    /// Resolves a multi-choice fix to a concrete replacement.
    ///
    /// Returns `None` when `value` is not one of the offered values. Single
    /// fixes are returned unchanged regardless of `value`.
    pub fn choose(&self, value: &str) -> Option<Fix> {
        match self {
            Fix::ReplaceEnumValueMulti {
                field,
                allowed_values,
            } => allowed_values
                .iter()
                .any(|v| v == value)
                .then(|| Fix::ReplaceEnumValue {
                    field: field.clone(),
                    value: value.to_string(),
                }),
            other => Some(other.clone()),
        }
    }

    pub fn needs_choice(&self) -> bool {
        matches!(self, Fix::ReplaceEnumValueMulti { .. })
    }

    /// One-line label suitable for a menu entry.
    pub fn describe(&self) -> String {
        match self {
            Fix::DeleteSection { name } => format!("Remove the empty {name} section"),
            Fix::InsertField { name, value } if value.is_empty() => format!("Add a {name} field"),
            Fix::InsertField { name, value } => format!("Add {name}: {value}"),
            Fix::ReplaceEnumValue { field, value } => format!("Set {field} to {value}"),
            Fix::ReplaceEnumValueMulti {
                field,
                allowed_values,
            } => format!("Set {field} to one of {}", allowed_values.join(", ")),
        }
    }
}

/// A single validation observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub message: String,
    /// The field or section the finding is about, when there is one.
    pub field_or_section: Option<String>,
    pub fix: Option<Fix>,
}

impl Finding {
    pub fn new(kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            field_or_section: None,
            fix: None,
        }
    }

    pub fn about(mut self, name: impl Into<String>) -> Self {
        self.field_or_section = Some(name.into());
        self
    }

    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fix = Some(fix);
        self
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

/// Everything the validator has to say about one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// True when there are no errors. Warnings and info do not count.
    pub valid: bool,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub info: Vec<Finding>,
    /// Top-level fields the schema does not know about.
    pub custom_fields: Vec<String>,
    /// Sections the schema does not know about.
    pub custom_sections: Vec<String>,
}

impl ValidationReport {
    /// Files a finding under the list its severity belongs to.
    pub fn push(&mut self, finding: Finding) {
        match finding.severity() {
            Severity::Error => self.errors.push(finding),
            Severity::Warning => self.warnings.push(finding),
            Severity::Info => self.info.push(finding),
        }
    }

    /// All findings, errors first, then warnings, then info.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .chain(self.info.iter())
    }

    /// Findings that carry a fix, in [`findings`](Self::findings) order.
    pub fn fixes(&self) -> impl Iterator<Item = (&Finding, &Fix)> {
        self.findings()
            .filter_map(|finding| finding.fix.as_ref().map(|fix| (finding, fix)))
    }

    pub fn count(&self, kind: FindingKind) -> usize {
        self.findings().filter(|f| f.kind == kind).count()
    }
}
