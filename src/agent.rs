use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEvent {
    /// A chunk of answer text, line terminator included.
    Output(String),
    /// Backend stderr; never part of the answer text.
    Diagnostic(String),
    System(String),
    Completed { success: bool, code: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Codex,
    Claude,
    Gemini,
}

impl BackendKind {
    pub(crate) fn from_program(program: &str) -> Self {
        let binary = Path::new(program)
            .file_name()
            .and_then(|value| value.to_str())
            .unwrap_or(program)
            .to_ascii_lowercase();
        if binary.contains("claude") {
            Self::Claude
        } else if binary.contains("gemini") {
            Self::Gemini
        } else {
            Self::Codex
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Codex => "codex",
            Self::Claude => "claude",
            Self::Gemini => "gemini",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    PlainText,
    JsonAssistantOnly,
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub program: String,
    pub args_prefix: Vec<String>,
    pub output_mode: OutputMode,
    pub persistent_session: bool,
    pub model: Option<String>,
    pub model_reasoning_effort: Option<String>,
}

impl BackendConfig {
    pub fn default_for_backend(backend: BackendKind) -> Self {
        match backend {
            BackendKind::Codex => Self {
                program: "codex".to_string(),
                // Answers are text only, so the backend never needs write access.
                args_prefix: vec![
                    "exec".to_string(),
                    "--sandbox".to_string(),
                    "read-only".to_string(),
                    "--skip-git-repo-check".to_string(),
                    "--color".to_string(),
                    "never".to_string(),
                    "--json".to_string(),
                ],
                output_mode: OutputMode::JsonAssistantOnly,
                persistent_session: true,
                model: None,
                model_reasoning_effort: None,
            },
            BackendKind::Claude => Self {
                program: "claude".to_string(),
                args_prefix: Vec::new(),
                output_mode: OutputMode::JsonAssistantOnly,
                persistent_session: true,
                model: None,
                model_reasoning_effort: None,
            },
            BackendKind::Gemini => Self {
                program: "gemini".to_string(),
                args_prefix: Vec::new(),
                output_mode: OutputMode::PlainText,
                persistent_session: false,
                model: None,
                model_reasoning_effort: None,
            },
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        BackendKind::from_program(&self.program)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::default_for_backend(BackendKind::Codex)
    }
}

/// Conversation with one backend CLI. Each prompt runs the CLI once; persistent backends
/// resume the captured session id on later prompts.
pub struct ModelSession {
    config: BackendConfig,
    event_tx: Sender<AgentEvent>,
    event_rx: Receiver<AgentEvent>,
    session_id: Arc<Mutex<Option<String>>>,
}

impl ModelSession {
    pub fn with_config(config: BackendConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        Self {
            config,
            event_tx,
            event_rx,
            session_id: Arc::new(Mutex::new(None)),
        }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// True when the next prompt starts a fresh backend conversation.
    pub fn starts_new_conversation(&self) -> bool {
        !self.config.persistent_session || self.saved_session_id().is_none()
    }

    pub fn send_prompt(&self, prompt: String) {
        let config = self.config.clone();
        let tx = self.event_tx.clone();
        let session_id = self.session_id.clone();
        thread::spawn(move || {
            let mut command = Command::new(&config.program);
            let known_session = if config.persistent_session {
                session_id.lock().ok().and_then(|g| g.clone())
            } else {
                None
            };
            match known_session {
                Some(existing_session) => {
                    log::debug!("resuming {} session {existing_session}", config.program);
                    command
                        .args(build_resume_prompt_args(&config, &existing_session))
                        .arg(prompt);
                }
                None => {
                    log::debug!("starting new {} session", config.program);
                    command.args(build_new_session_args(&config)).arg(prompt);
                }
            }
            command
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());

            let mut child = match command.spawn() {
                Ok(child) => child,
                Err(err) => {
                    log::error!("failed to start {}: {err}", config.program);
                    let _ = tx.send(AgentEvent::System(format!(
                        "{} failed to start: {err}",
                        config.program
                    )));
                    let _ = tx.send(AgentEvent::Completed {
                        success: false,
                        code: -1,
                    });
                    return;
                }
            };

            let mut readers = Vec::new();
            if let Some(stdout) = child.stdout.take() {
                readers.push(spawn_stdout_reader(
                    stdout,
                    tx.clone(),
                    config.output_mode,
                    session_id.clone(),
                ));
            }
            if let Some(stderr) = child.stderr.take() {
                readers.push(spawn_stderr_reader(stderr, tx.clone()));
            }

            let wait_result = child.wait();
            for reader in readers {
                let _ = reader.join();
            }
            emit_completion_event(&tx, &config.program, wait_result);
        });
    }

    #[cfg(test)]
    pub fn drain_events(&self) -> Vec<AgentEvent> {
        self.drain_events_limited(usize::MAX)
    }

    pub fn drain_events_limited(&self, max_events: usize) -> Vec<AgentEvent> {
        let mut events = Vec::new();
        if max_events == 0 {
            return events;
        }
        while events.len() < max_events {
            let Ok(event) = self.event_rx.try_recv() else {
                break;
            };
            events.push(event);
        }
        events
    }

    pub fn reset_session(&self) {
        if let Ok(mut lock) = self.session_id.lock() {
            *lock = None;
        }
    }

    pub fn saved_session_id(&self) -> Option<String> {
        self.session_id.lock().ok().and_then(|lock| lock.clone())
    }
}

fn spawn_stdout_reader<R: std::io::Read + Send + 'static>(
    reader: R,
    tx: Sender<AgentEvent>,
    output_mode: OutputMode,
    session_id: Arc<Mutex<Option<String>>>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for line in BufReader::new(reader).lines().map_while(Result::ok) {
            match output_mode {
                OutputMode::PlainText => {
                    let _ = tx.send(AgentEvent::Output(format!("{line}\n")));
                }
                OutputMode::JsonAssistantOnly => {
                    if let Some(found) = parse_session_id_from_jsonl_line(&line)
                        && let Ok(mut lock) = session_id.lock()
                        && lock.is_none()
                    {
                        log::debug!("captured backend session id {found}");
                        *lock = Some(found);
                    }
                    if let Some(mut text) = parse_assistant_text_from_jsonl_line(&line) {
                        if !text.ends_with('\n') {
                            text.push('\n');
                        }
                        let _ = tx.send(AgentEvent::Output(text));
                    }
                }
            }
        }
    })
}

fn spawn_stderr_reader<R: std::io::Read + Send + 'static>(
    reader: R,
    tx: Sender<AgentEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for line in BufReader::new(reader).lines().map_while(Result::ok) {
            log::debug!("backend stderr: {line}");
            let _ = tx.send(AgentEvent::Diagnostic(line));
        }
    })
}

/// Answer text carried by a JSON event line, for both the Codex and Claude stream formats.
fn parse_assistant_text_from_jsonl_line(line: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(line).ok()?;
    match value.get("type")?.as_str()? {
        "item.completed" => {
            let item = value.get("item")?;
            if item.get("type")?.as_str()? != "agent_message" {
                return None;
            }
            item.get("text")?.as_str().map(ToString::to_string)
        }
        "assistant" => {
            let content = value.get("message")?.get("content")?.as_array()?;
            let text: String = content
                .iter()
                .filter(|block| block.get("type").and_then(|t| t.as_str()) == Some("text"))
                .filter_map(|block| block.get("text").and_then(|t| t.as_str()))
                .collect();
            if text.is_empty() { None } else { Some(text) }
        }
        _ => None,
    }
}

fn sanitize_resume_args(args: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len());
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--color" || arg == "--sandbox" {
            let _ = iter.next();
            continue;
        }
        out.push(arg);
    }
    out
}

fn build_new_session_args(config: &BackendConfig) -> Vec<String> {
    let mut args = config.args_prefix.clone();
    match config.backend_kind() {
        BackendKind::Codex => {
            append_codex_model_selection_args(
                &mut args,
                config.model.as_deref(),
                config.model_reasoning_effort.as_deref(),
            );
        }
        BackendKind::Claude => {
            append_claude_output_args(&mut args, config.output_mode);
            append_model_arg(&mut args, config.model.as_deref());
            args.push("-p".to_string());
        }
        BackendKind::Gemini => {
            append_model_arg(&mut args, config.model.as_deref());
            args.push("-p".to_string());
        }
    }
    args
}

fn build_resume_args(config: &BackendConfig) -> Vec<String> {
    match config.backend_kind() {
        BackendKind::Codex => {
            let mut args = config.args_prefix.clone();
            if args.first().is_some_and(|arg| arg == "exec") {
                args.remove(0);
            }
            let mut args = sanitize_resume_args(args);
            append_codex_model_selection_args(
                &mut args,
                config.model.as_deref(),
                config.model_reasoning_effort.as_deref(),
            );
            args
        }
        BackendKind::Claude | BackendKind::Gemini => {
            let mut args = config.args_prefix.clone();
            if config.backend_kind() == BackendKind::Claude {
                append_claude_output_args(&mut args, config.output_mode);
            }
            append_model_arg(&mut args, config.model.as_deref());
            args
        }
    }
}

fn build_resume_prompt_args(config: &BackendConfig, existing_session: &str) -> Vec<String> {
    match config.backend_kind() {
        BackendKind::Codex => {
            let mut args = vec!["exec".to_string(), "resume".to_string()];
            args.extend(build_resume_args(config));
            args.push(existing_session.to_string());
            args
        }
        BackendKind::Claude | BackendKind::Gemini => {
            let mut args = build_resume_args(config);
            args.push("--resume".to_string());
            args.push(existing_session.to_string());
            args.push("-p".to_string());
            args
        }
    }
}

fn append_claude_output_args(args: &mut Vec<String>, output_mode: OutputMode) {
    if matches!(output_mode, OutputMode::JsonAssistantOnly) {
        args.push("--output-format".to_string());
        args.push("stream-json".to_string());
        args.push("--verbose".to_string());
    }
}

fn append_codex_model_selection_args(
    args: &mut Vec<String>,
    model: Option<&str>,
    model_reasoning_effort: Option<&str>,
) {
    append_model_arg(args, model);
    if let Some(effort) = model_reasoning_effort
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        args.push("-c".to_string());
        args.push(format!("model_reasoning_effort={effort:?}"));
    }
}

fn append_model_arg(args: &mut Vec<String>, model: Option<&str>) {
    if let Some(model) = model.map(str::trim).filter(|value| !value.is_empty()) {
        args.push("--model".to_string());
        args.push(model.to_string());
    }
}

fn emit_completion_event(
    tx: &Sender<AgentEvent>,
    program: &str,
    wait_result: std::io::Result<std::process::ExitStatus>,
) {
    match wait_result {
        Ok(status) => {
            let code = status.code().unwrap_or(-1);
            if !status.success() {
                log::warn!("{program} exited with status code {code}");
                let _ = tx.send(AgentEvent::System(format!(
                    "{program} exited with status code {code}"
                )));
            }
            let _ = tx.send(AgentEvent::Completed {
                success: status.success(),
                code,
            });
        }
        Err(err) => {
            log::error!("failed waiting for {program}: {err}");
            let _ = tx.send(AgentEvent::System(format!(
                "{program} failed while waiting for process: {err}"
            )));
            let _ = tx.send(AgentEvent::Completed {
                success: false,
                code: -1,
            });
        }
    }
}

fn parse_session_id_from_jsonl_line(line: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(line).ok()?;
    let direct = value
        .get("session_id")
        .and_then(|v| v.as_str())
        .or_else(|| value.get("conversation_id").and_then(|v| v.as_str()))
        .or_else(|| value.get("thread_id").and_then(|v| v.as_str()));
    if let Some(id) = direct
        && looks_like_session_id(id)
    {
        return Some(id.to_string());
    }
    let session_obj = value.get("session")?;
    let nested = session_obj
        .get("id")
        .and_then(|v| v.as_str())
        .or_else(|| session_obj.get("session_id").and_then(|v| v.as_str()));
    nested
        .filter(|id| looks_like_session_id(id))
        .map(ToString::to_string)
}

fn looks_like_session_id(id: &str) -> bool {
    let trimmed = id.trim();
    if trimmed.len() < 8 || trimmed.contains(char::is_whitespace) {
        return false;
    }
    trimmed
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

#[cfg(test)]
#[path = "../tests/unit/agent_tests.rs"]
mod tests;
