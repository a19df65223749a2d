//! Re-derives the structured view of a (possibly still streaming) model answer.
//!
//! [`parse`] is called with the whole accumulated text after every chunk. It never fails: a
//! block whose end marker has not arrived yet is simply absent, and text without any
//! recognized block is shown as plain theory.

use serde::Serialize;

use crate::protocol::{self, Family, Field};

pub const DEFAULT_CODE_LANGUAGE: &str = "text";
pub const LATEX_CODE_LANGUAGE: &str = "latex";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub code_language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refined_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changelog: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_structure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pending: Vec<Field>,
    fallback: bool,
}

impl Default for ParsedRecord {
    fn default() -> Self {
        Self {
            theory: None,
            code: None,
            code_language: DEFAULT_CODE_LANGUAGE.to_string(),
            output: None,
            metrics: None,
            refined_text: None,
            changelog: None,
            latex: None,
            conversion_notes: None,
            doc_structure: None,
            markdown: None,
            pending: Vec::new(),
            fallback: false,
        }
    }
}

impl ParsedRecord {
    /// Record shown for a turn whose transport failed; nothing was parsed.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            theory: Some(message.into()),
            fallback: true,
            ..Self::default()
        }
    }

    /// Non-empty value of `field`.
    pub fn field(&self, field: Field) -> Option<&str> {
        self.slot(field)
            .as_deref()
            .filter(|value| !value.is_empty())
    }

    pub fn has(&self, field: Field) -> bool {
        self.field(field).is_some()
    }

    /// Fields whose start marker has arrived but whose end marker has not.
    pub fn pending_fields(&self) -> &[Field] {
        &self.pending
    }

    pub fn is_pending(&self, field: Field) -> bool {
        self.pending.contains(&field)
    }

    /// True when no block was recognized and `theory` holds the raw text.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    fn slot(&self, field: Field) -> &Option<String> {
        match field {
            Field::Theory => &self.theory,
            Field::Code => &self.code,
            Field::Output => &self.output,
            Field::Metrics => &self.metrics,
            Field::RefinedText => &self.refined_text,
            Field::Changelog => &self.changelog,
            Field::ConversionNotes => &self.conversion_notes,
            Field::DocStructure => &self.doc_structure,
            Field::Latex => &self.latex,
            Field::Markdown => &self.markdown,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Theory => &mut self.theory,
            Field::Code => &mut self.code,
            Field::Output => &mut self.output,
            Field::Metrics => &mut self.metrics,
            Field::RefinedText => &mut self.refined_text,
            Field::Changelog => &mut self.changelog,
            Field::ConversionNotes => &mut self.conversion_notes,
            Field::DocStructure => &mut self.doc_structure,
            Field::Latex => &mut self.latex,
            Field::Markdown => &mut self.markdown,
        }
    }

    fn any_present(&self) -> bool {
        Field::ALL.into_iter().any(|field| self.has(field))
    }

    fn any_present_in(&self, family: Family) -> bool {
        family.fields().any(|field| self.has(field))
    }
}

pub fn parse(text: &str) -> ParsedRecord {
    let mut record = ParsedRecord::default();

    for field in Field::ALL {
        match protocol::find_block(text, field) {
            Some(found) => {
                if let Some(language) = found.language {
                    record.code_language = language.to_lowercase();
                }
                *record.slot_mut(field) = Some(found.body.trim().to_string());
            }
            None => {
                if protocol::find_opener(text, field).is_some() {
                    record.pending.push(field);
                }
            }
        }
    }

    if record.latex.is_some() {
        record.code_language = LATEX_CODE_LANGUAGE.to_string();
    }

    if !record.any_present() {
        record.theory = Some(text.to_string());
        record.fallback = true;
        return record;
    }

    let lead_missing = [Family::Creation, Family::Utility, Family::Document]
        .into_iter()
        .all(|family| !record.has(family.lead_field()));
    if lead_missing {
        salvage_lead_field(text, &mut record);
    }

    record
}

fn detected_family(record: &ParsedRecord) -> Family {
    if record.any_present_in(Family::Creation) {
        Family::Creation
    } else if record.any_present_in(Family::Utility) {
        Family::Utility
    } else {
        Family::Document
    }
}

/// Uses the free text ahead of the family's first block as its lead field, e.g. an
/// introduction the model wrote before opening the code block without a theory block.
fn salvage_lead_field(text: &str, record: &mut ParsedRecord) {
    let family = detected_family(record);
    let Some(offset) = protocol::first_family_opener(text, family) else {
        return;
    };
    let pre_text = text[..offset].trim();
    if pre_text.is_empty() || protocol::contains_start_marker(pre_text) {
        return;
    }
    log::trace!(
        "salvaged {} bytes of lead text for {:?}",
        pre_text.len(),
        family.lead_field()
    );
    *record.slot_mut(family.lead_field()) = Some(pre_text.to_string());
}

#[cfg(test)]
#[path = "../tests/unit/parser_tests.rs"]
mod tests;
