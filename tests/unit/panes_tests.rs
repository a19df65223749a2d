use super::*;
use crate::parser::parse;

fn titles(panes: &PaneSet) -> [&str; 3] {
    let (slot1, slot2, slot3) = panes.slots();
    [
        slot1.title.as_str(),
        slot2.title.as_str(),
        slot3.title.as_str(),
    ]
}

#[test]
fn creation_response_fills_all_three_slots() {
    let panes = resolve(&parse(
        "[START_THEORY]Big-O basics[END_THEORY][START_CODE_PYTHON]print(1)[END_CODE][START_OUTPUT_SCREENSHOT]1[END_OUTPUT]",
    ));
    assert_eq!(panes.shape, ResponseShape::Creation);
    assert_eq!(
        titles(&panes),
        ["Theory & Logic", "Implementation (python)", "Execution / Output"]
    );
    let (slot1, slot2, slot3) = panes.slots();
    assert_eq!(slot1.content.as_deref(), Some("Big-O basics"));
    assert_eq!(slot1.render, RenderMode::MarkdownProse);
    assert_eq!(
        slot2.render,
        RenderMode::SyntaxHighlighted {
            language: "python".to_string()
        }
    );
    assert_eq!(slot2.content.as_deref(), Some("print(1)"));
    assert_eq!(slot3.render, RenderMode::RawPreformatted);
    assert_eq!(slot3.content.as_deref(), Some("1"));
    assert!(panes.slots.iter().all(|slot| slot.state == SlotState::Present));
}

#[test]
fn metrics_only_response_is_utility_with_placeholders() {
    let panes = resolve(&parse("[START_ANALYSIS_METRICS]AI Score: 12%[END_METRICS]"));
    assert_eq!(panes.shape, ResponseShape::Utility);
    let (slot1, slot2, slot3) = panes.slots();
    assert_eq!(slot1.title, "Analysis & Metrics");
    assert_eq!(slot1.content.as_deref(), Some("AI Score: 12%"));
    assert!(slot2.content.is_none());
    assert_eq!(slot2.placeholder, "Processing text refinement...");
    assert_eq!(slot2.render, RenderMode::PlainProse);
    assert!(slot3.content.is_none());
    assert_eq!(slot3.placeholder, "Logging modifications...");
    assert_eq!(slot3.render, RenderMode::MarkdownProse);
}

#[test]
fn utility_shape_never_offers_copy() {
    let panes = resolve(&parse(
        "[START_ANALYSIS_METRICS]m[END_METRICS][START_REFINED_TEXT]r[END_TEXT][START_CHANGELOG]c[END_CHANGELOG]",
    ));
    assert!(panes.slots.iter().all(|slot| !slot.can_copy));
    assert!(panes.copyable().is_none());
}

#[test]
fn only_slot2_can_copy_in_other_shapes() {
    for text in [
        "[START_THEORY]t[END_THEORY]",
        "[START_LATEX_CONVERSION]l[END_LATEX_CONVERSION]",
        "[START_MARKDOWN_CONTENT]m[END_MARKDOWN_CONTENT]",
        "conversation",
    ] {
        let panes = resolve(&parse(text));
        let (slot1, slot2, slot3) = panes.slots();
        assert!(!slot1.can_copy, "{text}");
        assert!(slot2.can_copy, "{text}");
        assert!(!slot3.can_copy, "{text}");
    }
}

#[test]
fn latex_with_notes_resolves_to_organizer() {
    let panes = resolve(&parse(
        "[START_CONVERSION_NOTES]Escaped 4 characters.[END_CONVERSION_NOTES][START_LATEX_CONVERSION]\\documentclass[journal]{IEEEtran}[END_LATEX_CONVERSION]",
    ));
    assert_eq!(panes.shape, ResponseShape::Organizer);
    assert_eq!(
        titles(&panes),
        ["Conversion Report", "LaTeX Source", "Document Structure"]
    );
    let slot2 = panes.slot(SlotPosition::Slot2);
    assert_eq!(
        slot2.render,
        RenderMode::SyntaxHighlighted {
            language: "latex".to_string()
        }
    );
    assert_eq!(
        panes.slot(SlotPosition::Slot3).placeholder,
        "Mapping section hierarchy..."
    );
}

#[test]
fn markdown_alone_resolves_to_markdown_with_report_placeholder() {
    let panes = resolve(&parse("[START_MARKDOWN_CONTENT]# Title[END_MARKDOWN_CONTENT]"));
    assert_eq!(panes.shape, ResponseShape::Markdown);
    let (slot1, slot2, _) = panes.slots();
    assert_eq!(slot1.title, "Cleanup Report");
    assert!(slot1.content.is_none());
    assert_eq!(slot1.placeholder, "Analyzing document structure...");
    assert_eq!(slot2.title, "Markdown Source");
    assert_eq!(slot2.content.as_deref(), Some("# Title"));
    assert_eq!(
        slot2.render,
        RenderMode::SyntaxHighlighted {
            language: "markdown".to_string()
        }
    );
}

#[test]
fn markdown_wins_over_latex() {
    let panes = resolve(&parse(
        "[START_LATEX_CONVERSION]\\section{A}[END_LATEX_CONVERSION][START_MARKDOWN_CONTENT]# A[END_MARKDOWN_CONTENT]",
    ));
    assert_eq!(panes.shape, ResponseShape::Markdown);
    assert_eq!(
        panes.slot(SlotPosition::Slot2).content.as_deref(),
        Some("# A")
    );
}

#[test]
fn utility_wins_over_every_other_shape() {
    let panes = resolve(&parse(
        "[START_THEORY]t[END_THEORY][START_LATEX_CONVERSION]l[END_LATEX_CONVERSION][START_CHANGELOG]c[END_CHANGELOG]",
    ));
    assert_eq!(panes.shape, ResponseShape::Utility);
}

#[test]
fn plain_conversation_shows_theory_only() {
    let panes = resolve(&parse("Which language should the project use?"));
    assert_eq!(panes.shape, ResponseShape::Plain);
    let (slot1, slot2, slot3) = panes.slots();
    assert_eq!(slot1.title, "Theory & Logic");
    assert_eq!(
        slot1.content.as_deref(),
        Some("Which language should the project use?")
    );
    assert!(slot2.content.is_none());
    assert!(slot3.content.is_none());
    assert_eq!(slot2.title, "Implementation (text)");
}

#[test]
fn empty_stream_resolves_to_placeholders() {
    let panes = resolve(&parse(""));
    assert_eq!(panes.shape, ResponseShape::Plain);
    assert!(panes.slots.iter().all(|slot| !slot.has_content()));
    assert_eq!(
        panes.slot(SlotPosition::Slot1).placeholder,
        "Waiting for academic analysis..."
    );
    assert!(panes.slots.iter().all(|slot| slot.state == SlotState::Waiting));
}

#[test]
fn unclosed_block_marks_slot_pending() {
    let panes = resolve(&parse(
        "[START_THEORY]t[END_THEORY][START_CODE_RUST]fn main() {",
    ));
    assert_eq!(panes.shape, ResponseShape::Creation);
    assert_eq!(panes.slot(SlotPosition::Slot1).state, SlotState::Present);
    assert_eq!(panes.slot(SlotPosition::Slot2).state, SlotState::Pending);
    assert_eq!(panes.slot(SlotPosition::Slot3).state, SlotState::Waiting);
}

#[test]
fn failure_record_resolves_to_message_in_slot1() {
    let panes = resolve(&ParsedRecord::failure("Error: could not reach backend."));
    let (slot1, slot2, slot3) = panes.slots();
    assert_eq!(slot1.content.as_deref(), Some("Error: could not reach backend."));
    assert!(slot2.content.is_none());
    assert!(slot3.content.is_none());
}

#[test]
fn resolve_is_idempotent() {
    let record = parse("[START_DOC_STRUCTURE]1. Intro[END_DOC_STRUCTURE]");
    assert_eq!(resolve(&record), resolve(&record));
}

#[test]
fn doc_structure_alone_stays_creation() {
    let panes = resolve(&parse("[START_DOC_STRUCTURE]1. Intro[END_DOC_STRUCTURE]"));
    assert_eq!(panes.shape, ResponseShape::Creation);
    assert!(panes.slots.iter().all(|slot| !slot.has_content()));
}

#[test]
fn short_labels_follow_shape() {
    let utility = resolve(&parse("[START_CHANGELOG]c[END_CHANGELOG]"));
    let labels: Vec<_> = utility.slots.iter().map(|slot| slot.short_label).collect();
    assert_eq!(labels, ["Analysis", "Result", "Log"]);

    let organizer = resolve(&parse("[START_LATEX_CONVERSION]l[END_LATEX_CONVERSION]"));
    let labels: Vec<_> = organizer.slots.iter().map(|slot| slot.short_label).collect();
    assert_eq!(labels, ["Analysis", "Source", "Struct"]);
}
