//! Parser tests.
//!
//! Fixtures (.md) and their debug snapshots (.snap) are co-located in
//! `fixtures/`.

use pretty_assertions::assert_eq;

use crate::parsing::{LineKind, ParsedDocument, classify_line, parse};

#[test]
fn fixture_job_full() {
    assert_fixture("job_full");
}

#[test]
fn fixture_messy() {
    assert_fixture("messy");
}

#[test]
fn fixture_profile_nested_fields() {
    assert_fixture("profile_nested_fields");
}

fn assert_fixture(name: &str) {
    let fixtures_dir = format!("{}/src/parsing/tests/fixtures", env!("CARGO_MANIFEST_DIR"));
    let text = std::fs::read_to_string(format!("{fixtures_dir}/{name}.md")).unwrap();

    let doc = parse(&text);
    insta::with_settings!({
        snapshot_path => fixtures_dir.as_str(),
        prepend_module_to_snapshot => false,
    }, {
        insta::assert_debug_snapshot!(name, doc);
    });
}

#[test]
fn example_job_document() {
    let doc = parse("<JOB>\nTITLE: Engineer\n# REQUIRED_SKILLS\n- Go\n</JOB>");

    assert_eq!(doc.entity_type.as_deref(), Some("JOB"));
    assert_eq!(doc.top_level_fields.len(), 1);
    assert_eq!(doc.field("TITLE"), Some("Engineer"));
    assert_eq!(doc.sections.len(), 1);
    assert_eq!(doc.sections["REQUIRED_SKILLS"].items, vec!["Go".to_string()]);
    assert_eq!(doc.sections["REQUIRED_SKILLS"].fields, None);
}

#[test]
fn parse_is_deterministic() {
    let text = "<JOB>\nTITLE: A\n# X\n- 1\n# Y\nK: v\n- 2\n";
    assert_eq!(parse(text), parse(text));
}

#[test]
fn empty_document() {
    let doc = parse("");
    assert!(doc.is_empty());
    assert_eq!(doc, ParsedDocument::default());
}

#[test]
fn comments_only() {
    let doc = parse("// one\n   // two\n//three");
    assert!(doc.is_empty());
}

#[test]
fn unstructured_text_parses_to_empty_document() {
    let doc = parse("Dear hiring manager,\nI am writing to apply.\n\t\u{feff}¿qué?\n");
    assert!(doc.is_empty());
    assert_eq!(doc.entity_type, None);
}

#[test]
fn arbitrary_unicode_does_not_panic() {
    let inputs = [
        "\u{0}\u{1}\u{7f}",
        "TITLE: 工程师 // 备注",
        "# 日本語\n- 項目",
        "<ÉTAT>\n</ÉTAT>",
        "KEY: 🦀🦀 //🦀",
        "\r\n\r\n\r",
        "- \u{200b}",
        ":\n::\nA:: b",
    ];
    for input in inputs {
        let _ = parse(input);
    }
}

#[test]
fn many_repeated_section_headers() {
    let text = "# SKILLS\n- a\n".repeat(5_000);
    let doc = parse(&text);

    assert_eq!(doc.sections.len(), 1);
    assert_eq!(doc.sections["SKILLS"].items, vec!["a".to_string()]);
}

#[test]
fn reopened_section_replaces_earlier_one() {
    let doc = parse("# A\n- 1\n# B\n- 2\n# A\n- 3\n");

    let labels: Vec<_> = doc.sections.keys().cloned().collect();
    assert_eq!(labels, vec!["B".to_string(), "A".to_string()]);
    assert_eq!(doc.sections["A"].items, vec!["3".to_string()]);
}

#[test]
fn section_spellings_share_a_key() {
    let doc = parse("# REQUIRED SKILLS\n- Go\n");
    assert!(doc.sections.contains_key("REQUIRED_SKILLS"));
    assert!(doc.section("REQUIRED SKILLS").is_some());
}

#[test]
fn first_type_tag_wins() {
    let doc = parse("<PROFILE>\n<JOB>\n");
    assert_eq!(doc.entity_type.as_deref(), Some("PROFILE"));
}

#[test]
fn list_items_before_any_section_are_dropped() {
    let doc = parse("- stray\nTITLE: x\n# S\n- kept\n");
    assert_eq!(doc.sections["S"].items, vec!["kept".to_string()]);
    assert_eq!(doc.field("TITLE"), Some("x"));
}

#[test]
fn duplicate_top_level_key_last_wins() {
    let doc = parse("TITLE: first\nTITLE: second\n");
    assert_eq!(doc.field("TITLE"), Some("second"));
}

#[test]
fn key_values_inside_sections_are_nested() {
    let doc = parse("TITLE: t\n# NOTES\nSOURCE: referral\n- call back\n");

    assert_eq!(doc.top_level_fields.len(), 1);
    let notes = &doc.sections["NOTES"];
    assert_eq!(notes.items, vec!["call back".to_string()]);
    let fields = notes.fields.as_ref().expect("nested fields recorded");
    assert_eq!(fields.get("SOURCE").map(String::as_str), Some("referral"));
}

#[test]
fn type_close_does_not_end_section() {
    let doc = parse("<JOB>\n# S\n- a\n</JOB>\n- b\n");
    assert_eq!(doc.sections["S"].items, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn crlf_line_endings() {
    let doc = parse("<JOB>\r\nTITLE: Engineer\r\n# SKILLS\r\n- Go\r\n</JOB>\r\n");
    assert_eq!(doc.field("TITLE"), Some("Engineer"));
    assert_eq!(doc.sections["SKILLS"].items, vec!["Go".to_string()]);
}

#[test]
fn classifier_and_parser_agree_on_comment_stripping() {
    assert_eq!(
        classify_line("TITLE: Engineer // from LinkedIn"),
        LineKind::KeyValue {
            key: "TITLE".to_string(),
            value: "Engineer".to_string(),
        }
    );
    assert_eq!(parse("TITLE: Engineer // from LinkedIn").field("TITLE"), Some("Engineer"));
}
