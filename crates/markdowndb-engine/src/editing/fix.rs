use xi_rope::{Delta, Rope, RopeInfo, delta::Builder};

use crate::parsing::{
    LineClass, LineKind, classified_lines, normalize_label,
    rope::{Span, slice_to_string},
};
use crate::validation::Fix;

use super::patch::{Patch, remap_cursor};

/// Why a fix could not be applied to the current text.
///
/// Every variant means the fix is stale or incomplete; the text is left
/// alone. Re-validate and offer fresh fixes instead of retrying.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FixError {
    #[error("Section {0} is no longer in the document")]
    SectionNotFound(String),
    #[error("Field {0} is no longer in the document")]
    FieldNotFound(String),
    #[error("Field {0} is already in the document")]
    FieldAlreadyPresent(String),
    #[error("A value must be chosen for field {0}")]
    ChoiceRequired(String),
}

/// A single text replacement: swap `span` for `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    span: Span,
    text: String,
}

/// Applies one fix, or returns the text untouched if the fix is stale.
///
/// Performs exactly one patch and never re-validates; run the pipeline again
/// on the returned text for a fresh report.
pub fn apply_fix(text: &str, fix: &Fix, cursor: usize) -> Patch {
    match try_apply_fix(text, fix, cursor) {
        Ok(patch) => patch,
        Err(err) => {
            log::warn!("Skipping stale fix ({}): {err}", fix.describe());
            Patch::unchanged(text, cursor)
        }
    }
}

/// Applies one fix, reporting why it could not be applied.
pub fn try_apply_fix(text: &str, fix: &Fix, cursor: usize) -> Result<Patch, FixError> {
    let rope = Rope::from(text);
    let lines: Vec<LineClass> = classified_lines(&rope).collect();

    let edit = match fix {
        Fix::DeleteSection { name } => delete_section(&lines, rope.len(), name)?,
        Fix::InsertField { name, value } => insert_field(&lines, name, value)?,
        Fix::ReplaceEnumValue { field, value } => replace_value(&rope, &lines, field, value)?,
        Fix::ReplaceEnumValueMulti { field, .. } => {
            return Err(FixError::ChoiceRequired(field.clone()));
        }
    };

    let delta = compile_edit(&edit, rope.len());
    let new_text = delta.apply(&rope).to_string();
    let cursor = remap_cursor(cursor.min(rope.len()), edit.span, edit.text.len());

    Ok(Patch {
        text: new_text,
        cursor,
        changed: Some(edit.span.start..edit.span.start + edit.text.len()),
    })
}

fn compile_edit(edit: &Edit, base_len: usize) -> Delta<RopeInfo> {
    let mut builder = Builder::new(base_len);
    if edit.text.is_empty() {
        builder.delete(edit.span.range());
    } else {
        builder.replace(edit.span.range(), Rope::from(&edit.text));
    }
    builder.build()
}

/// Lines before the first section header.
fn top_level(lines: &[LineClass]) -> &[LineClass] {
    let end = lines
        .iter()
        .position(|l| matches!(l.kind, LineKind::SectionHeader(_)))
        .unwrap_or(lines.len());
    &lines[..end]
}

/// The header line plus everything up to the next header, closing tag or end
/// of text. When the section is the last one, a single blank line in front of
/// it goes too so no dangling separator is left behind.
fn delete_section(lines: &[LineClass], text_len: usize, name: &str) -> Result<Edit, FixError> {
    let wanted = normalize_label(name);
    // A reopened section replaces earlier copies, so the last header is the live one.
    let header = lines
        .iter()
        .rposition(|l| {
            matches!(&l.kind, LineKind::SectionHeader(label) if normalize_label(label) == wanted)
        })
        .ok_or_else(|| FixError::SectionNotFound(name.to_string()))?;

    let next = lines[header + 1..]
        .iter()
        .find(|l| matches!(l.kind, LineKind::SectionHeader(_) | LineKind::TypeClose));

    let mut start = lines[header].line.start;
    let end = next.map_or(text_len, |l| l.line.start);

    let followed_by_section = matches!(next.map(|l| &l.kind), Some(LineKind::SectionHeader(_)));
    if !followed_by_section && header > 0 && lines[header - 1].is_blank {
        start = lines[header - 1].line.start;
    }

    Ok(Edit {
        span: Span::new(start, end),
        text: String::new(),
    })
}

/// A new `NAME: value` line after the last top-level field, or at the very
/// start of the text when there is none.
fn insert_field(lines: &[LineClass], name: &str, value: &str) -> Result<Edit, FixError> {
    let top = top_level(lines);
    if top
        .iter()
        .any(|l| matches!(&l.kind, LineKind::KeyValue { key, .. } if key == name))
    {
        return Err(FixError::FieldAlreadyPresent(name.to_string()));
    }

    let value = value.replace(['\r', '\n'], " ");
    let field_line = format!("{name}: {value}");

    let last_field = top
        .iter()
        .rev()
        .find(|l| matches!(l.kind, LineKind::KeyValue { .. }));

    let edit = match last_field {
        Some(line) if line.has_newline => Edit {
            span: Span::point(line.line.end),
            text: format!("{field_line}\n"),
        },
        Some(line) => Edit {
            span: Span::point(line.line.end),
            text: format!("\n{field_line}"),
        },
        None => Edit {
            span: Span::point(0),
            text: format!("{field_line}\n"),
        },
    };
    Ok(edit)
}

/// Swaps the value of the effective (last) top-level `FIELD:` line, keeping
/// the key, spacing and any trailing comment.
fn replace_value(
    rope: &Rope,
    lines: &[LineClass],
    field: &str,
    value: &str,
) -> Result<Edit, FixError> {
    let line = top_level(lines)
        .iter()
        .rev()
        .find(|l| matches!(&l.kind, LineKind::KeyValue { key, .. } if key == field))
        .ok_or_else(|| FixError::FieldNotFound(field.to_string()))?;

    let span = line
        .value_span
        .ok_or_else(|| FixError::FieldNotFound(field.to_string()))?;

    let value = value.replace(['\r', '\n'], " ");
    let before = slice_to_string(rope, Span::new(line.line.start, span.start));
    let after = slice_to_string(rope, Span::new(span.end, line.line.end));
    let mut text = if before.ends_with(char::is_whitespace) {
        value
    } else {
        format!(" {value}")
    };
    // A blank value's span touches a trailing comment; keep the marker separated.
    if !after.is_empty() && !after.starts_with(char::is_whitespace) {
        text.push(' ');
    }

    Ok(Edit { span, text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::parse;
    use pretty_assertions::assert_eq;

    const THREE_SECTIONS: &str = "<JOB>\nTITLE: Engineer\n\n# A\n- a1\n- a2\n\n# B\n- b1\n\n# C\n\
        - c1\n</JOB>\n";

    fn delete(name: &str) -> Fix {
        Fix::DeleteSection {
            name: name.to_string(),
        }
    }

    #[test]
    fn deleting_middle_section_keeps_neighbours() {
        let before = parse(THREE_SECTIONS);
        let patch = apply_fix(THREE_SECTIONS, &delete("B"), 0);
        let after = parse(&patch.text);

        assert_eq!(
            patch.text,
            "<JOB>\nTITLE: Engineer\n\n# A\n- a1\n- a2\n\n# C\n- c1\n</JOB>\n"
        );
        assert_eq!(after.sections.keys().collect::<Vec<_>>(), vec!["A", "C"]);
        assert_eq!(after.sections["A"].items, before.sections["A"].items);
        assert_eq!(after.sections["C"].items, before.sections["C"].items);
    }

    #[test]
    fn deleting_last_section_keeps_closing_tag_and_trims_blank() {
        let patch = apply_fix(THREE_SECTIONS, &delete("C"), 0);
        assert_eq!(
            patch.text,
            "<JOB>\nTITLE: Engineer\n\n# A\n- a1\n- a2\n\n# B\n- b1\n</JOB>\n"
        );
    }

    #[test]
    fn deleting_section_at_end_of_text() {
        let text = "TITLE: x\n\n# A\n- a\n\n# B\n- b";
        let patch = apply_fix(text, &delete("B"), 0);
        assert_eq!(patch.text, "TITLE: x\n\n# A\n- a\n");
    }

    #[test]
    fn delete_matches_either_spelling() {
        let text = "# REQUIRED SKILLS\n# NOTES\n- n\n";
        let patch = apply_fix(text, &delete("REQUIRED_SKILLS"), 0);
        assert_eq!(patch.text, "# NOTES\n- n\n");
    }

    #[test]
    fn delete_remaps_cursor() {
        let start = THREE_SECTIONS.find("# B").unwrap();
        let end = THREE_SECTIONS.find("# C").unwrap();
        let len = end - start;

        assert_eq!(apply_fix(THREE_SECTIONS, &delete("B"), 3).cursor, 3);
        assert_eq!(apply_fix(THREE_SECTIONS, &delete("B"), start + 4).cursor, start);
        assert_eq!(apply_fix(THREE_SECTIONS, &delete("B"), end + 2).cursor, end + 2 - len);
    }

    #[test]
    fn deleting_missing_section_is_noop() {
        let patch = apply_fix(THREE_SECTIONS, &delete("Z"), 17);
        assert!(patch.is_noop());
        assert_eq!(patch.text, THREE_SECTIONS);
        assert_eq!(patch.cursor, 17);
        assert_eq!(
            try_apply_fix(THREE_SECTIONS, &delete("Z"), 17),
            Err(FixError::SectionNotFound("Z".to_string()))
        );
    }

    #[test]
    fn insert_field_after_last_top_level_field() {
        let text = "<JOB>\nTITLE: Engineer\n# REQUIRED_SKILLS\nLEVEL: x\n- Go\n</JOB>\n";
        let fix = Fix::InsertField {
            name: "COMPANY".to_string(),
            value: "Acme".to_string(),
        };
        let at = "<JOB>\nTITLE: Engineer\n".len();

        let patch = apply_fix(text, &fix, at);
        assert_eq!(
            patch.text,
            "<JOB>\nTITLE: Engineer\nCOMPANY: Acme\n# REQUIRED_SKILLS\nLEVEL: x\n- Go\n</JOB>\n"
        );
        assert_eq!(patch.cursor, at + "COMPANY: Acme\n".len());
        assert_eq!(patch.changed, Some(at..at + "COMPANY: Acme\n".len()));
        assert_eq!(apply_fix(text, &fix, 3).cursor, 3);
        assert_eq!(parse(&patch.text).field("COMPANY"), Some("Acme"));
    }

    #[test]
    fn insert_field_at_start_without_fields() {
        let fix = Fix::InsertField {
            name: "NAME".to_string(),
            value: String::new(),
        };
        let patch = apply_fix("<PROFILE>\n</PROFILE>\n", &fix, 0);
        assert_eq!(patch.text, "NAME: \n<PROFILE>\n</PROFILE>\n");
        assert_eq!(patch.cursor, "NAME: \n".len());
    }

    #[test]
    fn insert_field_after_unterminated_last_line() {
        let fix = Fix::InsertField {
            name: "COMPANY".to_string(),
            value: "Acme".to_string(),
        };
        let patch = apply_fix("TITLE: x", &fix, 8);
        assert_eq!(patch.text, "TITLE: x\nCOMPANY: Acme");
        assert_eq!(patch.cursor, 8 + "\nCOMPANY: Acme".len());
    }

    #[test]
    fn insert_existing_field_is_noop() {
        let fix = Fix::InsertField {
            name: "TITLE".to_string(),
            value: "again".to_string(),
        };
        assert_eq!(
            try_apply_fix("TITLE: x\n", &fix, 0),
            Err(FixError::FieldAlreadyPresent("TITLE".to_string()))
        );
        assert!(apply_fix("TITLE: x\n", &fix, 0).is_noop());
    }

    #[test]
    fn replace_value_keeps_comment() {
        let text = "<JOB>\nREMOTE_TYPE: moon // ask recruiter\n</JOB>\n";
        let fix = Fix::ReplaceEnumValue {
            field: "REMOTE_TYPE".to_string(),
            value: "REMOTE".to_string(),
        };
        let patch = apply_fix(text, &fix, text.len());

        assert_eq!(patch.text, "<JOB>\nREMOTE_TYPE: REMOTE // ask recruiter\n</JOB>\n");
        assert_eq!(patch.cursor, patch.text.len());
    }

    #[test]
    fn replace_value_cursor_inside_collapses_to_start() {
        let text = "REMOTE_TYPE: moon\n";
        let fix = Fix::ReplaceEnumValue {
            field: "REMOTE_TYPE".to_string(),
            value: "HYBRID".to_string(),
        };
        let value_start = "REMOTE_TYPE: ".len();
        assert_eq!(apply_fix(text, &fix, value_start + 2).cursor, value_start);
    }

    #[test]
    fn replace_empty_value_adds_space() {
        let fix = Fix::ReplaceEnumValue {
            field: "PAY_PERIOD".to_string(),
            value: "YEARLY".to_string(),
        };
        let patch = apply_fix("PAY_PERIOD:\n", &fix, 0);
        assert_eq!(patch.text, "PAY_PERIOD: YEARLY\n");
    }

    #[test]
    fn replace_targets_effective_duplicate() {
        let text = "REMOTE_TYPE: ONSITE\nREMOTE_TYPE: moon\n";
        let fix = Fix::ReplaceEnumValue {
            field: "REMOTE_TYPE".to_string(),
            value: "REMOTE".to_string(),
        };
        let patch = apply_fix(text, &fix, 0);
        assert_eq!(patch.text, "REMOTE_TYPE: ONSITE\nREMOTE_TYPE: REMOTE\n");
    }

    #[test]
    fn replace_ignores_fields_inside_sections() {
        let text = "# NOTES\nREMOTE_TYPE: moon\n";
        let fix = Fix::ReplaceEnumValue {
            field: "REMOTE_TYPE".to_string(),
            value: "REMOTE".to_string(),
        };
        assert_eq!(
            try_apply_fix(text, &fix, 0),
            Err(FixError::FieldNotFound("REMOTE_TYPE".to_string()))
        );
    }

    #[test]
    fn multi_fix_needs_a_choice() {
        let fix = Fix::ReplaceEnumValueMulti {
            field: "REMOTE_TYPE".to_string(),
            allowed_values: vec!["REMOTE".to_string()],
        };
        let text = "REMOTE_TYPE: moon\n";
        assert_eq!(
            try_apply_fix(text, &fix, 0),
            Err(FixError::ChoiceRequired("REMOTE_TYPE".to_string()))
        );

        let chosen = fix.choose("REMOTE").unwrap();
        assert_eq!(apply_fix(text, &chosen, 0).text, "REMOTE_TYPE: REMOTE\n");
    }

    #[test]
    fn cursor_past_end_is_clamped() {
        let patch = apply_fix("# A\n", &delete("A"), 999);
        assert_eq!(patch.text, "");
        assert_eq!(patch.cursor, 0);
    }

    #[test]
    fn deleting_reopened_section_keeps_earlier_items() {
        let text = "<JOB>\nTITLE: t\nCOMPANY: c\n# REQUIRED_SKILLS\n- Go\n# NOTES\n- n\n\
            # REQUIRED_SKILLS\n</JOB>\n";

        let patch = apply_fix(text, &delete("REQUIRED_SKILLS"), 0);

        assert_eq!(
            patch.text,
            "<JOB>\nTITLE: t\nCOMPANY: c\n# REQUIRED_SKILLS\n- Go\n# NOTES\n- n\n</JOB>\n"
        );
        let doc = parse(&patch.text);
        assert_eq!(doc.section("REQUIRED_SKILLS").unwrap().items, vec!["Go"]);
        assert_eq!(doc.section("NOTES").unwrap().items, vec!["n"]);
    }

    #[test]
    fn replacing_blank_template_value_keeps_comment() {
        let text = "<JOB>\nREMOTE_TYPE: // REMOTE | HYBRID | ONSITE\n</JOB>\n";
        let fix = Fix::ReplaceEnumValue {
            field: "REMOTE_TYPE".to_string(),
            value: "HYBRID".to_string(),
        };

        let patch = apply_fix(text, &fix, 0);

        assert_eq!(
            patch.text,
            "<JOB>\nREMOTE_TYPE: HYBRID // REMOTE | HYBRID | ONSITE\n</JOB>\n"
        );
        assert_eq!(parse(&patch.text).field("REMOTE_TYPE"), Some("HYBRID"));
    }

    #[test]
    fn replacing_value_glued_to_comment_separates_them() {
        let text = "REMOTE_TYPE://pick one\n";
        let fix = Fix::ReplaceEnumValue {
            field: "REMOTE_TYPE".to_string(),
            value: "REMOTE".to_string(),
        };

        let patch = apply_fix(text, &fix, 0);

        assert_eq!(patch.text, "REMOTE_TYPE: REMOTE //pick one\n");
        assert_eq!(parse(&patch.text).field("REMOTE_TYPE"), Some("REMOTE"));
    }
}
