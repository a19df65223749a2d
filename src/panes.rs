//! Maps a parsed record onto the three display slots.
//!
//! The shape is classified once per call and each shape has its own resolver, so the
//! priority order lives in one place ([`ResponseShape::detect`]).

use serde::Serialize;

use crate::parser::{LATEX_CODE_LANGUAGE, ParsedRecord};
use crate::protocol::Field;

pub const MARKDOWN_CODE_LANGUAGE: &str = "markdown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseShape {
    Creation,
    Utility,
    Organizer,
    Markdown,
    Plain,
}

impl ResponseShape {
    pub fn detect(record: &ParsedRecord) -> Self {
        if record.has(Field::Metrics)
            || record.has(Field::RefinedText)
            || record.has(Field::Changelog)
        {
            Self::Utility
        } else if record.has(Field::Latex) && !record.has(Field::Markdown) {
            Self::Organizer
        } else if record.has(Field::Markdown) {
            Self::Markdown
        } else if record.is_fallback() {
            Self::Plain
        } else {
            Self::Creation
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Creation => "Creation",
            Self::Utility => "Utility",
            Self::Organizer => "Organizer",
            Self::Markdown => "Markdown",
            Self::Plain => "Conversation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotPosition {
    Slot1,
    Slot2,
    Slot3,
}

impl SlotPosition {
    pub const ALL: [SlotPosition; 3] = [Self::Slot1, Self::Slot2, Self::Slot3];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Category of a slot, shown as a glyph next to its title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotIcon {
    Book,
    Code,
    Terminal,
    Metrics,
    Pen,
    List,
    Report,
    LatexSource,
    Tree,
    MarkdownSource,
}

impl SlotIcon {
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Book => "§",
            Self::Code => "<>",
            Self::Terminal => "$",
            Self::Metrics => "%",
            Self::Pen => "~",
            Self::List => "≡",
            Self::Report => "¶",
            Self::LatexSource => "\\",
            Self::Tree => "├",
            Self::MarkdownSource => "#",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RenderMode {
    MarkdownProse,
    SyntaxHighlighted { language: String },
    PlainProse,
    RawPreformatted,
}

/// Whether a slot's field has arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    Present,
    /// The start marker arrived but the block is not closed yet.
    Pending,
    /// Nothing for this slot yet; the response may never contain it.
    Waiting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaneSlot {
    pub position: SlotPosition,
    pub title: String,
    pub short_label: &'static str,
    pub icon: SlotIcon,
    pub content: Option<String>,
    pub placeholder: &'static str,
    pub render: RenderMode,
    pub can_copy: bool,
    pub state: SlotState,
}

impl PaneSlot {
    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    /// Content when it can be offered for copying.
    pub fn copyable_content(&self) -> Option<&str> {
        if self.can_copy {
            self.content.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaneSet {
    pub shape: ResponseShape,
    pub slots: [PaneSlot; 3],
}

impl PaneSet {
    pub fn slot(&self, position: SlotPosition) -> &PaneSlot {
        &self.slots[position.index()]
    }

    pub fn slots(&self) -> (&PaneSlot, &PaneSlot, &PaneSlot) {
        let [slot1, slot2, slot3] = &self.slots;
        (slot1, slot2, slot3)
    }

    /// The slot whose content can be copied, if any has content right now.
    pub fn copyable(&self) -> Option<&PaneSlot> {
        self.slots
            .iter()
            .find(|slot| slot.copyable_content().is_some())
    }
}

struct SlotSpec {
    field: Field,
    title: String,
    short_label: &'static str,
    icon: SlotIcon,
    placeholder: &'static str,
    render: RenderMode,
    can_copy: bool,
}

pub fn resolve(record: &ParsedRecord) -> PaneSet {
    let shape = ResponseShape::detect(record);
    let specs = match shape {
        ResponseShape::Creation | ResponseShape::Plain => creation_slots(record),
        ResponseShape::Utility => utility_slots(),
        ResponseShape::Organizer => organizer_slots(),
        ResponseShape::Markdown => markdown_slots(),
    };
    let [spec1, spec2, spec3] = specs;
    PaneSet {
        shape,
        slots: [
            build_slot(record, SlotPosition::Slot1, spec1),
            build_slot(record, SlotPosition::Slot2, spec2),
            build_slot(record, SlotPosition::Slot3, spec3),
        ],
    }
}

fn build_slot(record: &ParsedRecord, position: SlotPosition, spec: SlotSpec) -> PaneSlot {
    let content = record.field(spec.field).map(ToString::to_string);
    let state = if content.is_some() {
        SlotState::Present
    } else if record.is_pending(spec.field) {
        SlotState::Pending
    } else {
        SlotState::Waiting
    };
    PaneSlot {
        position,
        title: spec.title,
        short_label: spec.short_label,
        icon: spec.icon,
        content,
        placeholder: spec.placeholder,
        render: spec.render,
        can_copy: spec.can_copy,
        state,
    }
}

fn creation_slots(record: &ParsedRecord) -> [SlotSpec; 3] {
    [
        SlotSpec {
            field: Field::Theory,
            title: "Theory & Logic".to_string(),
            short_label: "Theory",
            icon: SlotIcon::Book,
            placeholder: "Waiting for academic analysis...",
            render: RenderMode::MarkdownProse,
            can_copy: false,
        },
        SlotSpec {
            field: Field::Code,
            title: format!("Implementation ({})", record.code_language),
            short_label: "Code",
            icon: SlotIcon::Code,
            placeholder: "// Waiting for solution implementation...",
            render: RenderMode::SyntaxHighlighted {
                language: record.code_language.clone(),
            },
            can_copy: true,
        },
        SlotSpec {
            field: Field::Output,
            title: "Execution / Output".to_string(),
            short_label: "Output",
            icon: SlotIcon::Terminal,
            placeholder: "$ _ waiting for execution",
            render: RenderMode::RawPreformatted,
            can_copy: false,
        },
    ]
}

fn utility_slots() -> [SlotSpec; 3] {
    [
        SlotSpec {
            field: Field::Metrics,
            title: "Analysis & Metrics".to_string(),
            short_label: "Analysis",
            icon: SlotIcon::Metrics,
            placeholder: "Analyzing text content...",
            render: RenderMode::MarkdownProse,
            can_copy: false,
        },
        SlotSpec {
            field: Field::RefinedText,
            title: "Refined Content".to_string(),
            short_label: "Result",
            icon: SlotIcon::Pen,
            placeholder: "Processing text refinement...",
            render: RenderMode::PlainProse,
            can_copy: false,
        },
        SlotSpec {
            field: Field::Changelog,
            title: "Change Log".to_string(),
            short_label: "Log",
            icon: SlotIcon::List,
            placeholder: "Logging modifications...",
            render: RenderMode::MarkdownProse,
            can_copy: false,
        },
    ]
}

fn organizer_slots() -> [SlotSpec; 3] {
    [
        document_report_slot("Conversion Report"),
        SlotSpec {
            field: Field::Latex,
            title: "LaTeX Source".to_string(),
            short_label: "Source",
            icon: SlotIcon::LatexSource,
            placeholder: "% Waiting for LaTeX conversion...",
            render: RenderMode::SyntaxHighlighted {
                language: LATEX_CODE_LANGUAGE.to_string(),
            },
            can_copy: true,
        },
        document_structure_slot(),
    ]
}

fn markdown_slots() -> [SlotSpec; 3] {
    [
        document_report_slot("Cleanup Report"),
        SlotSpec {
            field: Field::Markdown,
            title: "Markdown Source".to_string(),
            short_label: "Source",
            icon: SlotIcon::MarkdownSource,
            placeholder: "<!-- Waiting for Markdown conversion -->",
            render: RenderMode::SyntaxHighlighted {
                language: MARKDOWN_CODE_LANGUAGE.to_string(),
            },
            can_copy: true,
        },
        document_structure_slot(),
    ]
}

fn document_report_slot(title: &str) -> SlotSpec {
    SlotSpec {
        field: Field::ConversionNotes,
        title: title.to_string(),
        short_label: "Analysis",
        icon: SlotIcon::Report,
        placeholder: "Analyzing document structure...",
        render: RenderMode::MarkdownProse,
        can_copy: false,
    }
}

fn document_structure_slot() -> SlotSpec {
    SlotSpec {
        field: Field::DocStructure,
        title: "Document Structure".to_string(),
        short_label: "Struct",
        icon: SlotIcon::Tree,
        placeholder: "Mapping section hierarchy...",
        render: RenderMode::RawPreformatted,
        can_copy: false,
    }
}

#[cfg(test)]
#[path = "../tests/unit/panes_tests.rs"]
mod tests;
