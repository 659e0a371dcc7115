use crate::parsing::ParsedDocument;

use super::{
    schema::Schema,
    types::{Finding, FindingKind, Fix, ValidationReport},
};

/// Checks a parsed document against a schema.
///
/// Pure: the same document and schema always give the same report. The
/// schema drives every check; no entity kind is special-cased here.
pub fn validate(doc: &ParsedDocument, schema: &Schema) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_type(doc, schema, &mut report);
    check_required_fields(doc, schema, &mut report);
    check_sections(doc, schema, &mut report);
    check_enumerated_fields(doc, schema, &mut report);
    collect_custom_content(doc, schema, &mut report);

    report.valid = report.errors.is_empty();
    report
}

fn check_type(doc: &ParsedDocument, schema: &Schema, report: &mut ValidationReport) {
    match doc.entity_type.as_deref() {
        None => report.push(Finding::new(
            FindingKind::MissingType,
            format!(
                "Document has no type declaration; expected <{}>",
                schema.entity_type
            ),
        )),
        Some(tag) if tag != schema.entity_type => report.push(
            Finding::new(
                FindingKind::TypeMismatch,
                format!(
                    "Document is declared as <{tag}> but is being read as <{}>",
                    schema.entity_type
                ),
            )
            .about(tag),
        ),
        Some(_) => {}
    }
}

fn check_required_fields(doc: &ParsedDocument, schema: &Schema, report: &mut ValidationReport) {
    for name in &schema.required_top_level_fields {
        match doc.field(name) {
            Some(value) if !value.trim().is_empty() => {}
            Some(_) => report.push(
                Finding::new(
                    FindingKind::MissingRequiredField,
                    format!("Required field {name} is empty"),
                )
                .about(name.as_str()),
            ),
            None => report.push(
                Finding::new(
                    FindingKind::MissingRequiredField,
                    format!("Required field {name} is missing"),
                )
                .about(name.as_str())
                .with_fix(Fix::InsertField {
                    name: name.clone(),
                    value: String::new(),
                }),
            ),
        }
    }
}

fn check_sections(doc: &ParsedDocument, schema: &Schema, report: &mut ValidationReport) {
    for (label, _) in schema.sections.iter().filter(|(_, rule)| rule.required) {
        match doc.sections.get(label) {
            None => report.push(
                Finding::new(
                    FindingKind::MissingRequiredSection,
                    format!("Required section {label} is missing"),
                )
                .about(label.as_str()),
            ),
            Some(section) if section.is_empty() => report.push(
                Finding::new(
                    FindingKind::EmptySection,
                    format!("Section {label} has no items"),
                )
                .about(label.as_str())
                .with_fix(Fix::DeleteSection {
                    name: label.clone(),
                }),
            ),
            Some(_) => {}
        }
    }
}

fn check_enumerated_fields(doc: &ParsedDocument, schema: &Schema, report: &mut ValidationReport) {
    for (name, value) in &doc.top_level_fields {
        let Some(allowed) = schema.allowed_values(name) else {
            continue;
        };
        // An empty value is an unfilled field, not a wrong one.
        if value.trim().is_empty() || allowed.contains(value.as_str()) {
            continue;
        }

        let fix = match allowed.iter().find(|v| v.eq_ignore_ascii_case(value)) {
            Some(exact) => Fix::ReplaceEnumValue {
                field: name.clone(),
                value: exact.clone(),
            },
            None => Fix::ReplaceEnumValueMulti {
                field: name.clone(),
                allowed_values: allowed.iter().cloned().collect(),
            },
        };

        report.push(
            Finding::new(
                FindingKind::InvalidEnumValue,
                format!(
                    "{name} is {value:?}; expected one of {}",
                    allowed.iter().cloned().collect::<Vec<_>>().join(", ")
                ),
            )
            .about(name.as_str())
            .with_fix(fix),
        );
    }
}

fn collect_custom_content(doc: &ParsedDocument, schema: &Schema, report: &mut ValidationReport) {
    for name in doc.top_level_fields.keys() {
        if schema.is_known_field(name) {
            continue;
        }
        report.custom_fields.push(name.clone());
        report.push(
            Finding::new(FindingKind::CustomField, format!("Custom field {name}"))
                .about(name.as_str()),
        );
    }

    for label in doc.sections.keys() {
        if schema.sections.contains_key(label) {
            continue;
        }
        report.custom_sections.push(label.clone());
        report.push(
            Finding::new(FindingKind::CustomSection, format!("Custom section {label}"))
                .about(label.as_str()),
        );
    }
}
