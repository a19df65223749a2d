//! Command-line interface: launch flags for the TUI and the headless `parse` command.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::agent::BackendKind;
use crate::artifact_io;
use crate::logging::LogLevelArg;
use crate::panes::{self, PaneSet, PaneSlot, ResponseShape, SlotState};
use crate::parser::{self, ParsedRecord};

/// unipro-tui - terminal front-end for structured academic answers
#[derive(Debug, Parser)]
#[command(name = "unipro-tui")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (default: ~/.unipro/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Backend CLI that produces answers
    #[arg(long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Model passed to the backend CLI
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Send the contents of this file as the first message
    #[arg(long, value_name = "PATH")]
    pub send_file: Option<PathBuf>,

    /// Log level for the log file
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevelArg>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Parse a tagged response and print the three resolved panes
    Parse {
        /// Response file to read (default: stdin)
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,

        /// Print the record and panes as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct ParseReport<'a> {
    shape: ResponseShape,
    record: &'a ParsedRecord,
    slots: &'a [PaneSlot; 3],
}

pub fn run_parse(file: Option<&Path>, json: bool) -> io::Result<()> {
    let raw = match file {
        Some(path) => artifact_io::read_text_file(path)?,
        None => artifact_io::read_stdin_text()?,
    };
    let report = if json {
        parse_report_json(&raw)?
    } else {
        parse_report_text(&raw)
    };
    let mut stdout = io::stdout().lock();
    stdout.write_all(report.as_bytes())?;
    stdout.flush()
}

pub fn parse_report_json(raw: &str) -> io::Result<String> {
    let record = parser::parse(raw);
    let panes = panes::resolve(&record);
    let mut text = serde_json::to_string_pretty(&ParseReport {
        shape: panes.shape,
        record: &record,
        slots: &panes.slots,
    })
    .map_err(io::Error::other)?;
    text.push('\n');
    Ok(text)
}

pub fn parse_report_text(raw: &str) -> String {
    let record = parser::parse(raw);
    let panes = panes::resolve(&record);
    format_report(&record, &panes)
}

fn format_report(record: &ParsedRecord, panes: &PaneSet) -> String {
    let mut out = format!("shape: {}\n", panes.shape.label());
    if !record.pending_fields().is_empty() {
        let pending: Vec<String> = record
            .pending_fields()
            .iter()
            .map(|field| format!("{field:?}"))
            .collect();
        out.push_str(&format!("unclosed: {}\n", pending.join(", ")));
    }
    let (slot1, slot2, slot3) = panes.slots();
    for slot in [slot1, slot2, slot3] {
        let state = match slot.state {
            SlotState::Present => "present",
            SlotState::Pending => "streaming",
            SlotState::Waiting => "waiting",
        };
        let copy = if slot.can_copy { ", copyable" } else { "" };
        out.push_str(&format!(
            "\n== {} {} [{state}{copy}]\n",
            slot.icon.glyph(),
            slot.title
        ));
        out.push_str(slot.content.as_deref().unwrap_or(slot.placeholder));
        out.push('\n');
    }
    out
}
