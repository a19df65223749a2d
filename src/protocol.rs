//! Tag vocabulary shared with the backend prompt.
//!
//! Every content field of a response is delimited by a literal start/end marker pair. The
//! markers are a contract with the instruction text in [`crate::modules`] and must match
//! byte for byte.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

pub const START_MARKER_PREFIX: &str = "[START_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Theory,
    Code,
    Output,
    Metrics,
    RefinedText,
    Changelog,
    ConversionNotes,
    DocStructure,
    Latex,
    Markdown,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Theory,
        Field::Code,
        Field::Output,
        Field::Metrics,
        Field::RefinedText,
        Field::Changelog,
        Field::ConversionNotes,
        Field::DocStructure,
        Field::Latex,
        Field::Markdown,
    ];

    pub fn family(self) -> Family {
        match self {
            Field::Theory | Field::Code | Field::Output => Family::Creation,
            Field::Metrics | Field::RefinedText | Field::Changelog => Family::Utility,
            Field::ConversionNotes | Field::DocStructure | Field::Latex | Field::Markdown => {
                Family::Document
            }
        }
    }

    /// `TAG_PAIRS` is laid out in declaration order of `Field`.
    pub fn tag(self) -> &'static TagPair {
        &TAG_PAIRS[self as usize]
    }
}

/// Groups of tags that the model emits together for one kind of task.
///
/// Organizer and markdown responses share `conversionNotes`/`docStructure`, so they form a
/// single family here; the shape split happens in [`crate::panes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Creation,
    Utility,
    Document,
}

impl Family {
    pub fn lead_field(self) -> Field {
        match self {
            Family::Creation => Field::Theory,
            Family::Utility => Field::Metrics,
            Family::Document => Field::ConversionNotes,
        }
    }

    pub fn fields(self) -> impl Iterator<Item = Field> {
        Field::ALL.into_iter().filter(move |field| field.family() == self)
    }
}

#[derive(Debug)]
pub struct TagPair {
    pub field: Field,
    /// Literal start marker, or its fixed prefix for the parametric code tag.
    pub start: &'static str,
    pub end: &'static str,
    /// Whether `start` is followed by a `<LANG>]` suffix.
    pub parametric: bool,
}

pub static TAG_PAIRS: [TagPair; 10] = [
    TagPair {
        field: Field::Theory,
        start: "[START_THEORY]",
        end: "[END_THEORY]",
        parametric: false,
    },
    TagPair {
        field: Field::Code,
        start: "[START_CODE_",
        end: "[END_CODE]",
        parametric: true,
    },
    TagPair {
        field: Field::Output,
        start: "[START_OUTPUT_SCREENSHOT]",
        end: "[END_OUTPUT]",
        parametric: false,
    },
    TagPair {
        field: Field::Metrics,
        start: "[START_ANALYSIS_METRICS]",
        end: "[END_METRICS]",
        parametric: false,
    },
    TagPair {
        field: Field::RefinedText,
        start: "[START_REFINED_TEXT]",
        end: "[END_TEXT]",
        parametric: false,
    },
    TagPair {
        field: Field::Changelog,
        start: "[START_CHANGELOG]",
        end: "[END_CHANGELOG]",
        parametric: false,
    },
    TagPair {
        field: Field::ConversionNotes,
        start: "[START_CONVERSION_NOTES]",
        end: "[END_CONVERSION_NOTES]",
        parametric: false,
    },
    TagPair {
        field: Field::DocStructure,
        start: "[START_DOC_STRUCTURE]",
        end: "[END_DOC_STRUCTURE]",
        parametric: false,
    },
    TagPair {
        field: Field::Latex,
        start: "[START_LATEX_CONVERSION]",
        end: "[END_LATEX_CONVERSION]",
        parametric: false,
    },
    TagPair {
        field: Field::Markdown,
        start: "[START_MARKDOWN_CONTENT]",
        end: "[END_MARKDOWN_CONTENT]",
        parametric: false,
    },
];

const LANGUAGE_TOKEN: &str = "[A-Z0-9_]+";

struct CompiledPair {
    field: Field,
    /// Matches the full block; group `lang` (code only) and group `body`.
    block: Regex,
    /// Matches the start marker alone.
    opener: Regex,
}

// Patterns are built from the constant table above, so compilation cannot fail at runtime.
static COMPILED: LazyLock<Vec<CompiledPair>> = LazyLock::new(|| {
    Field::ALL
        .into_iter()
        .map(|field| {
            let pair = field.tag();
            let (block, opener) = if pair.parametric {
                let start = regex::escape(pair.start);
                (
                    format!(
                        r"(?s){start}(?P<lang>{LANGUAGE_TOKEN})\](?P<body>.*?){}",
                        regex::escape(pair.end)
                    ),
                    format!(r"{start}{LANGUAGE_TOKEN}\]"),
                )
            } else {
                (
                    format!(
                        r"(?s){}(?P<body>.*?){}",
                        regex::escape(pair.start),
                        regex::escape(pair.end)
                    ),
                    regex::escape(pair.start),
                )
            };
            CompiledPair {
                field: pair.field,
                block: Regex::new(&block).expect("tag block pattern is valid"),
                opener: Regex::new(&opener).expect("tag opener pattern is valid"),
            }
        })
        .collect()
});

fn compiled(field: Field) -> &'static CompiledPair {
    let pair = &COMPILED[field as usize];
    debug_assert_eq!(pair.field, field);
    pair
}

/// A closed block found in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockMatch<'a> {
    pub body: &'a str,
    /// Upper-case language suffix, only for the code tag.
    pub language: Option<&'a str>,
}

/// Finds the first start marker of `field` and the nearest end marker after it.
pub fn find_block(text: &str, field: Field) -> Option<BlockMatch<'_>> {
    let caps = compiled(field).block.captures(text)?;
    let body = caps.name("body")?.as_str();
    let language = caps.name("lang").map(|m| m.as_str());
    Some(BlockMatch { body, language })
}

/// Byte offset of the first start marker of `field`, closed or not.
pub fn find_opener(text: &str, field: Field) -> Option<usize> {
    compiled(field).opener.find(text).map(|m| m.start())
}

/// Byte offset of the earliest start marker belonging to `family`.
pub fn first_family_opener(text: &str, family: Family) -> Option<usize> {
    family.fields().filter_map(|field| find_opener(text, field)).min()
}

pub fn contains_start_marker(text: &str) -> bool {
    text.contains(START_MARKER_PREFIX)
}
