use super::*;

const CREATION_RESPONSE: &str = "[START_THEORY]Big-O basics[END_THEORY][START_CODE_PYTHON]print(1)[END_CODE][START_OUTPUT_SCREENSHOT]1[END_OUTPUT]";

fn char_prefixes(text: &str) -> impl Iterator<Item = &str> {
    text.char_indices()
        .map(|(idx, _)| &text[..idx])
        .chain(std::iter::once(text))
}

#[test]
fn parses_full_creation_triple() {
    let record = parse(CREATION_RESPONSE);
    assert_eq!(record.theory.as_deref(), Some("Big-O basics"));
    assert_eq!(record.code.as_deref(), Some("print(1)"));
    assert_eq!(record.code_language, "python");
    assert_eq!(record.output.as_deref(), Some("1"));
    assert!(record.metrics.is_none());
    assert!(record.latex.is_none());
    assert!(!record.is_fallback());
    assert!(record.pending_fields().is_empty());
}

#[test]
fn trims_block_interiors() {
    let record = parse("[START_CHANGELOG]\n  - Varied sentence length\n\n[END_CHANGELOG]");
    assert_eq!(record.changelog.as_deref(), Some("- Varied sentence length"));
}

#[test]
fn parses_every_tag_pair() {
    let text = "\
[START_ANALYSIS_METRICS]AI Score: 12%[END_METRICS]
[START_REFINED_TEXT]Refined.[END_TEXT]
[START_CHANGELOG]Changed.[END_CHANGELOG]
[START_CONVERSION_NOTES]Notes.[END_CONVERSION_NOTES]
[START_DOC_STRUCTURE]1. Intro[END_DOC_STRUCTURE]
[START_LATEX_CONVERSION]\\section{Intro}[END_LATEX_CONVERSION]
[START_MARKDOWN_CONTENT]# Intro[END_MARKDOWN_CONTENT]";
    let record = parse(text);
    assert_eq!(record.metrics.as_deref(), Some("AI Score: 12%"));
    assert_eq!(record.refined_text.as_deref(), Some("Refined."));
    assert_eq!(record.changelog.as_deref(), Some("Changed."));
    assert_eq!(record.conversion_notes.as_deref(), Some("Notes."));
    assert_eq!(record.doc_structure.as_deref(), Some("1. Intro"));
    assert_eq!(record.latex.as_deref(), Some("\\section{Intro}"));
    assert_eq!(record.markdown.as_deref(), Some("# Intro"));
    assert!(record.theory.is_none());
}

#[test]
fn code_language_defaults_to_text() {
    let record = parse("[START_THEORY]only theory[END_THEORY]");
    assert_eq!(record.code_language, DEFAULT_CODE_LANGUAGE);
    assert!(record.code.is_none());
}

#[test]
fn latex_block_forces_latex_language_even_with_code_block() {
    let record = parse(
        "[START_CODE_JAVA]class A {}[END_CODE][START_LATEX_CONVERSION]\\begin{document}[END_LATEX_CONVERSION]",
    );
    assert_eq!(record.code_language, LATEX_CODE_LANGUAGE);
    assert_eq!(record.code.as_deref(), Some("class A {}"));
}

#[test]
fn latex_override_applies_regardless_of_tag_order() {
    let record = parse(
        "[START_LATEX_CONVERSION]x[END_LATEX_CONVERSION][START_CODE_RUST]fn main() {}[END_CODE]",
    );
    assert_eq!(record.code_language, LATEX_CODE_LANGUAGE);
}

#[test]
fn fallback_assigns_plain_text_to_theory() {
    let record = parse("just a sentence, no tags");
    assert_eq!(record.theory.as_deref(), Some("just a sentence, no tags"));
    assert!(record.is_fallback());
    for field in Field::ALL.into_iter().filter(|f| *f != Field::Theory) {
        assert!(!record.has(field), "{field:?} should be empty");
    }
}

#[test]
fn fallback_on_empty_text_leaves_every_field_empty() {
    let record = parse("");
    assert_eq!(record.theory.as_deref(), Some(""));
    assert!(record.is_fallback());
    for field in Field::ALL {
        assert!(!record.has(field));
    }
}

#[test]
fn partial_block_falls_back_then_converges_to_interior() {
    let partial = "[START_THEORY]Explanation in progress";
    let record = parse(partial);
    assert!(record.is_fallback());
    assert_eq!(record.theory.as_deref(), Some(partial));
    assert!(record.is_pending(Field::Theory));

    let complete = format!("{partial} [END_THEORY]");
    let record = parse(&complete);
    assert!(!record.is_fallback());
    assert_eq!(record.theory.as_deref(), Some("Explanation in progress"));
    assert!(!record.is_pending(Field::Theory));
}

#[test]
fn unclosed_block_is_pending_while_other_blocks_are_present() {
    let record = parse("[START_THEORY]done[END_THEORY][START_CODE_PYTHON]def f(");
    assert_eq!(record.theory.as_deref(), Some("done"));
    assert!(record.code.is_none());
    assert_eq!(record.pending_fields(), &[Field::Code]);
    assert_eq!(record.code_language, DEFAULT_CODE_LANGUAGE);
}

#[test]
fn empty_block_counts_as_absent_for_fallback() {
    let record = parse("[START_THEORY]   [END_THEORY]");
    assert!(record.is_fallback());
    assert_eq!(record.theory.as_deref(), Some("[START_THEORY]   [END_THEORY]"));
}

#[test]
fn fallback_keeps_surrounding_whitespace_verbatim() {
    let record = parse("  hi  \n");
    assert_eq!(record.theory.as_deref(), Some("  hi  \n"));
    assert!(record.is_fallback());
    assert_eq!(record.field(Field::Theory), Some("  hi  \n"));
}

#[test]
fn salvages_multibyte_intro_before_code_block() {
    let record = parse("Résumé, voilà:\n[START_CODE_RUST]fn main() {}[END_CODE]");
    assert_eq!(record.theory.as_deref(), Some("Résumé, voilà:"));
    assert_eq!(record.code_language, "rust");
}

#[test]
fn salvages_intro_before_code_block_as_theory() {
    let record = parse(
        "Here is the solution you asked for.\n[START_CODE_PYTHON]print(2)[END_CODE]",
    );
    assert_eq!(
        record.theory.as_deref(),
        Some("Here is the solution you asked for.")
    );
    assert_eq!(record.code.as_deref(), Some("print(2)"));
    assert!(!record.is_fallback());
}

#[test]
fn salvages_intro_before_utility_blocks_as_metrics() {
    let record = parse("Scan summary\n[START_REFINED_TEXT]Better prose.[END_TEXT]");
    assert_eq!(record.metrics.as_deref(), Some("Scan summary"));
    assert!(record.theory.is_none());
}

#[test]
fn salvages_intro_before_document_blocks_as_conversion_notes() {
    let record = parse("Converted.\n[START_LATEX_CONVERSION]\\documentclass{article}[END_LATEX_CONVERSION]");
    assert_eq!(record.conversion_notes.as_deref(), Some("Converted."));
}

#[test]
fn salvage_skips_text_containing_a_start_marker() {
    let record = parse("[START_BROKEN] intro [START_CODE_C]int x;[END_CODE]");
    assert!(record.theory.is_none());
    assert_eq!(record.code.as_deref(), Some("int x;"));
}

#[test]
fn salvage_skips_empty_pre_text() {
    let record = parse("   [START_CODE_C]int x;[END_CODE]");
    assert!(record.theory.is_none());
}

#[test]
fn salvage_does_not_override_present_lead_field() {
    let record = parse("intro [START_THEORY]real[END_THEORY][START_CODE_C]x[END_CODE]");
    assert_eq!(record.theory.as_deref(), Some("real"));
}

#[test]
fn first_block_wins_when_a_tag_repeats() {
    let record = parse("[START_OUTPUT_SCREENSHOT]one[END_OUTPUT][START_OUTPUT_SCREENSHOT]two[END_OUTPUT]");
    assert_eq!(record.output.as_deref(), Some("one"));
}

#[test]
fn out_of_order_end_marker_does_not_match() {
    let record = parse("[END_THEORY]x[START_THEORY]y");
    assert!(record.is_fallback());
    assert!(record.is_pending(Field::Theory));
}

#[test]
fn parse_is_idempotent() {
    for text in [
        CREATION_RESPONSE,
        "",
        "plain",
        "[START_ANALYSIS_METRICS]m[END_METRICS][START_CHANGELOG]partial",
    ] {
        assert_eq!(parse(text), parse(text));
    }
}

#[test]
fn fields_never_regress_as_prefix_grows() {
    let full = format!(
        "Intro line.\n{CREATION_RESPONSE}\n[START_CONVERSION_NOTES]n[END_CONVERSION_NOTES]"
    );
    let final_record = parse(&full);
    let mut populated: Vec<Field> = Vec::new();
    for prefix in char_prefixes(&full) {
        let record = parse(prefix);
        for field in &populated {
            assert_eq!(
                record.field(*field),
                final_record.field(*field),
                "{field:?} regressed at prefix {prefix:?}"
            );
        }
        if record.is_fallback() {
            continue;
        }
        for field in Field::ALL {
            if record.has(field) && !populated.contains(&field) {
                populated.push(field);
            }
        }
    }
    assert!(populated.contains(&Field::Code));
    assert!(populated.contains(&Field::ConversionNotes));
}

#[test]
fn failure_record_carries_message_as_theory() {
    let record = ParsedRecord::failure("Error: backend unreachable.");
    assert_eq!(record.theory.as_deref(), Some("Error: backend unreachable."));
    assert!(record.is_fallback());
    assert_eq!(record.code_language, DEFAULT_CODE_LANGUAGE);
}

#[test]
fn serializes_with_camel_case_field_names() {
    let record = parse("[START_REFINED_TEXT]r[END_TEXT]");
    let json = serde_json::to_value(&record).expect("record should serialize");
    assert_eq!(json["refinedText"], "r");
    assert_eq!(json["codeLanguage"], "text");
    assert!(json.get("theory").is_none());
}
