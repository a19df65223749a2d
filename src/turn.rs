//! One prompt and the streamed answer it produced.

use crate::modules::ModuleType;
use crate::panes::{self, PaneSet};
use crate::parser::{self, ParsedRecord};

pub const FAILURE_MESSAGE: &str = "Error: Could not reach UniPro servers.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    Streaming,
    Completed,
    Failed,
}

#[derive(Debug, Clone)]
pub struct Turn {
    module: ModuleType,
    prompt: String,
    raw: String,
    status: TurnStatus,
    record: ParsedRecord,
    panes: PaneSet,
}

impl Turn {
    pub fn new(module: ModuleType, prompt: impl Into<String>) -> Self {
        let record = parser::parse("");
        let panes = panes::resolve(&record);
        Self {
            module,
            prompt: prompt.into(),
            raw: String::new(),
            status: TurnStatus::Streaming,
            record,
            panes,
        }
    }

    pub fn module(&self) -> ModuleType {
        self.module
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn raw_text(&self) -> &str {
        &self.raw
    }

    pub fn status(&self) -> TurnStatus {
        self.status
    }

    pub fn is_streaming(&self) -> bool {
        self.status == TurnStatus::Streaming
    }

    pub fn record(&self) -> &ParsedRecord {
        &self.record
    }

    pub fn panes(&self) -> &PaneSet {
        &self.panes
    }

    /// Appends a streamed chunk. Ignored once the turn has finished.
    pub fn push_output(&mut self, chunk: &str) {
        if !self.is_streaming() || chunk.is_empty() {
            return;
        }
        self.raw.push_str(chunk);
        self.reparse();
    }

    /// Replaces the text with a cumulative snapshot. Shorter snapshots are dropped.
    #[cfg(test)]
    pub fn apply_snapshot(&mut self, snapshot: &str) {
        if !self.is_streaming() || snapshot.len() <= self.raw.len() {
            return;
        }
        if !snapshot.starts_with(self.raw.as_str()) {
            log::warn!(
                "snapshot of {} bytes does not extend the current {} bytes",
                snapshot.len(),
                self.raw.len()
            );
        }
        self.raw = snapshot.to_string();
        self.reparse();
    }

    pub fn complete(&mut self) {
        if self.is_streaming() {
            self.status = TurnStatus::Completed;
            log::info!(
                "turn completed: {} bytes, shape {}",
                self.raw.len(),
                self.panes.shape.label()
            );
        }
    }

    /// Shows the failure message in place of whatever was parsed so far.
    pub fn fail(&mut self, reason: &str) {
        if !self.is_streaming() {
            return;
        }
        log::warn!("turn failed: {reason}");
        self.status = TurnStatus::Failed;
        self.record = ParsedRecord::failure(FAILURE_MESSAGE);
        self.panes = panes::resolve(&self.record);
    }

    fn reparse(&mut self) {
        self.record = parser::parse(&self.raw);
        self.panes = panes::resolve(&self.record);
    }
}
