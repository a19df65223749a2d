use std::cell::RefCell;
use std::sync::Arc;

use ratatui::text::Line;

use crate::modules::{self, ModuleType, UtilityTool};
use crate::panes::{PaneSet, SlotPosition};
use crate::text_layout::wrap_word_with_positions;
use crate::turn::{Turn, TurnStatus};

const COMMAND_INDEX: [(&str, &str); 6] = [
    ("/mode", "Switch module (assignment, project, thesis, utilities, organizer, markdown)"),
    ("/tool", "Pick a utility tool, or /tool off"),
    ("/new", "Start a new conversation"),
    ("/save", "Save the copyable pane to a file"),
    ("/quit", "Quit app"),
    ("/exit", "Quit app"),
];
const MAX_TURN_HISTORY: usize = 50;
const PROMPT_EXCERPT_CHARS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSuggestion {
    pub command: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Mode(String),
    Tool(String),
    New,
    Save(Option<String>),
    Quit,
    Unknown(String),
}

impl SlashCommand {
    pub fn parse(message: &str) -> Option<Self> {
        let trimmed = message.trim();
        if !trimmed.starts_with('/') {
            return None;
        }
        let (name, rest) = trimmed
            .split_once(char::is_whitespace)
            .map(|(name, rest)| (name, rest.trim()))
            .unwrap_or((trimmed, ""));
        let command = match name.to_ascii_lowercase().as_str() {
            "/mode" => Self::Mode(rest.to_string()),
            "/tool" => Self::Tool(rest.to_string()),
            "/new" => Self::New,
            "/save" => Self::Save((!rest.is_empty()).then(|| rest.to_string())),
            "/quit" | "/exit" => Self::Quit,
            _ => Self::Unknown(name.to_string()),
        };
        Some(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Chat,
    Slot1,
    Slot2,
    Slot3,
}

impl Pane {
    pub fn slot(self) -> Option<SlotPosition> {
        match self {
            Self::Chat => None,
            Self::Slot1 => Some(SlotPosition::Slot1),
            Self::Slot2 => Some(SlotPosition::Slot2),
            Self::Slot3 => Some(SlotPosition::Slot3),
        }
    }

    pub fn from_slot(position: SlotPosition) -> Self {
        match position {
            SlotPosition::Slot1 => Self::Slot1,
            SlotPosition::Slot2 => Self::Slot2,
            SlotPosition::Slot3 => Self::Slot3,
        }
    }
}

/// Why a message could not be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitBlockReason {
    Empty,
    TurnInProgress,
}

/// Rendered body of one slot, valid while `generation` matches the app's pane generation.
#[derive(Debug, Clone)]
struct SlotBodyCache {
    width: u16,
    generation: u64,
    lines: Arc<Vec<Line<'static>>>,
}

#[derive(Debug)]
pub struct App {
    pub running: bool,
    pub ticks: u64,
    pub active_pane: Pane,
    last_slot: SlotPosition,
    module: ModuleType,
    tool: Option<UtilityTool>,
    conversation_started: bool,
    turns: Vec<Turn>,
    panes_generation: u64,
    slot_body_cache: RefCell<[Option<SlotBodyCache>; 3]>,
    chat_messages: Vec<String>,
    chat_scroll: u16,
    slot_scroll: [u16; 3],
    chat_input: String,
    chat_cursor: usize,
    chat_cursor_goal_col: Option<u16>,
}

impl Default for App {
    fn default() -> Self {
        Self {
            running: true,
            ticks: 0,
            active_pane: Pane::Chat,
            last_slot: SlotPosition::Slot1,
            module: ModuleType::default(),
            tool: None,
            conversation_started: false,
            turns: Vec::new(),
            panes_generation: 0,
            slot_body_cache: RefCell::new([None, None, None]),
            chat_messages: Vec::new(),
            chat_scroll: 0,
            slot_scroll: [0; 3],
            chat_input: String::new(),
            chat_cursor: 0,
            chat_cursor_goal_col: None,
        }
    }
}

impl App {
    pub fn on_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn next_pane(&mut self) {
        self.set_active_pane(match self.active_pane {
            Pane::Chat => Pane::Slot1,
            Pane::Slot1 => Pane::Slot2,
            Pane::Slot2 => Pane::Slot3,
            Pane::Slot3 => Pane::Chat,
        });
    }

    pub fn prev_pane(&mut self) {
        self.set_active_pane(match self.active_pane {
            Pane::Chat => Pane::Slot3,
            Pane::Slot1 => Pane::Chat,
            Pane::Slot2 => Pane::Slot1,
            Pane::Slot3 => Pane::Slot2,
        });
    }

    pub fn set_active_pane(&mut self, pane: Pane) {
        self.active_pane = pane;
        if let Some(position) = pane.slot() {
            self.last_slot = position;
        }
    }

    /// Slot that global scroll keys act on: the focused slot, else the last one focused.
    pub fn scroll_target_slot(&self) -> SlotPosition {
        self.active_pane.slot().unwrap_or(self.last_slot)
    }

    pub fn input_char(&mut self, c: char) {
        let byte_idx = char_to_byte_idx(&self.chat_input, self.chat_cursor);
        self.chat_input.insert(byte_idx, c);
        self.chat_cursor = self.chat_cursor.saturating_add(1);
        self.chat_cursor_goal_col = None;
    }

    pub fn backspace_input(&mut self) {
        if self.chat_cursor == 0 {
            return;
        }

        let start = char_to_byte_idx(&self.chat_input, self.chat_cursor.saturating_sub(1));
        let end = char_to_byte_idx(&self.chat_input, self.chat_cursor);
        self.chat_input.drain(start..end);
        self.chat_cursor = self.chat_cursor.saturating_sub(1);
        self.chat_cursor_goal_col = None;
    }

    pub fn move_cursor_left(&mut self) {
        self.chat_cursor = self.chat_cursor.saturating_sub(1);
        self.chat_cursor_goal_col = None;
    }

    pub fn move_cursor_right(&mut self) {
        let char_len = self.chat_input.chars().count();
        self.chat_cursor = (self.chat_cursor + 1).min(char_len);
        self.chat_cursor_goal_col = None;
    }

    pub fn move_cursor_up(&mut self, width: u16) {
        let width = width.max(1);
        let positions = wrap_word_with_positions(&self.chat_input, width).positions;
        let (line, col) = positions[self.chat_cursor];
        if line == 0 {
            return;
        }
        let goal_col = self.chat_cursor_goal_col.unwrap_or(col);
        self.chat_cursor = nearest_index_for_line_col(&positions, line - 1, goal_col);
        self.chat_cursor_goal_col = Some(goal_col);
    }

    pub fn move_cursor_down(&mut self, width: u16) {
        let width = width.max(1);
        let positions = wrap_word_with_positions(&self.chat_input, width).positions;
        let (line, col) = positions[self.chat_cursor];
        let max_line = positions.iter().map(|(l, _)| *l).max().unwrap_or(0);
        if line >= max_line {
            return;
        }
        let goal_col = self.chat_cursor_goal_col.unwrap_or(col);
        self.chat_cursor = nearest_index_for_line_col(&positions, line + 1, goal_col);
        self.chat_cursor_goal_col = Some(goal_col);
    }

    pub fn scroll_chat_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_chat_down(&mut self, max_scroll: u16) {
        self.chat_scroll = (self.chat_scroll + 1).min(max_scroll);
    }

    pub fn set_chat_scroll(&mut self, scroll: u16) {
        self.chat_scroll = scroll;
    }

    pub fn scroll_slot_up(&mut self, position: SlotPosition, lines: u16) {
        let scroll = &mut self.slot_scroll[position.index()];
        *scroll = scroll.saturating_sub(lines);
    }

    pub fn scroll_slot_down(&mut self, position: SlotPosition, lines: u16, max_scroll: u16) {
        let scroll = &mut self.slot_scroll[position.index()];
        *scroll = scroll.saturating_add(lines).min(max_scroll);
    }

    pub fn slot_scroll(&self, position: SlotPosition) -> u16 {
        self.slot_scroll[position.index()]
    }

    pub fn chat_scroll(&self) -> u16 {
        self.chat_scroll
    }

    /// Checks whether the current input may be sent. Slash commands are always allowed.
    pub fn submit_block_reason(&self) -> Option<SubmitBlockReason> {
        let pending = self.chat_input.trim();
        if pending.is_empty() {
            Some(SubmitBlockReason::Empty)
        } else if self.is_turn_streaming() && SlashCommand::parse(pending).is_none() {
            Some(SubmitBlockReason::TurnInProgress)
        } else {
            None
        }
    }

    pub fn submit_chat_message(&mut self) -> Option<String> {
        let message = self.chat_input.trim().to_string();
        if message.is_empty() {
            return None;
        }

        self.chat_messages.push(format!("You: {message}"));
        self.clear_input();
        Some(message)
    }

    pub fn submit_direct_message(&mut self, raw_message: &str) -> Option<String> {
        let message = raw_message.trim().to_string();
        if message.is_empty() {
            return None;
        }
        self.chat_messages.push(format!("You: {message}"));
        self.clear_input();
        Some(message)
    }

    pub fn consume_chat_input_trimmed(&mut self) -> Option<String> {
        let message = self.chat_input.trim().to_string();
        self.clear_input();
        if message.is_empty() {
            None
        } else {
            Some(message)
        }
    }

    pub fn push_agent_message(&mut self, message: impl Into<String>) {
        self.chat_messages.push(message.into());
    }

    pub fn chat_lines(&self) -> &[String] {
        &self.chat_messages
    }

    pub fn chat_input(&self) -> &str {
        &self.chat_input
    }

    pub fn chat_cursor_line_col(&self, width: u16) -> (u16, u16) {
        let positions = wrap_word_with_positions(&self.chat_input, width.max(1)).positions;
        positions[self.chat_cursor]
    }

    pub fn command_suggestions(&self) -> Vec<CommandSuggestion> {
        let Some(query) = command_query(&self.chat_input) else {
            return Vec::new();
        };
        COMMAND_INDEX
            .iter()
            .filter(|(command, _)| command.starts_with(query))
            .map(|(command, description)| CommandSuggestion {
                command,
                description,
            })
            .collect()
    }

    pub fn should_show_command_index(&self) -> bool {
        !self.command_suggestions().is_empty()
    }

    pub fn autocomplete_top_command(&mut self) -> bool {
        let Some(top) = self.command_suggestions().first().copied() else {
            return false;
        };
        if self.chat_input.trim() == top.command {
            return false;
        }
        self.chat_input = top.command.to_string();
        self.chat_cursor = self.chat_input.chars().count();
        self.chat_cursor_goal_col = None;
        true
    }

    pub fn module(&self) -> ModuleType {
        self.module
    }

    pub fn tool(&self) -> Option<UtilityTool> {
        self.tool
    }

    pub fn select_module(&mut self, module: ModuleType) {
        if module != ModuleType::Utilities {
            self.tool = None;
        }
        if self.module == module {
            return;
        }
        self.module = module;
        self.push_agent_message(format!(
            "System: Switched to {}. {}",
            module.label(),
            module.description()
        ));
    }

    /// Picks a utility tool, switching to the utilities module when needed.
    pub fn select_tool(&mut self, tool: Option<UtilityTool>) {
        if tool.is_some() {
            self.select_module(ModuleType::Utilities);
        }
        self.tool = tool;
        match tool {
            Some(tool) => self.push_agent_message(format!("System: Tool set to {}.", tool.label())),
            None => self.push_agent_message("System: Tool cleared."),
        }
    }

    /// Moves to the next utility tool in sidebar order, clearing it after the last one.
    pub fn cycle_tool(&mut self) {
        let next = match self.tool {
            None => UtilityTool::ALL.first().copied(),
            Some(current) => UtilityTool::ALL
                .iter()
                .skip_while(|tool| **tool != current)
                .nth(1)
                .copied(),
        };
        self.select_tool(next);
    }

    /// Starts a turn for `message` and returns the prompt framed for the active module.
    pub fn begin_turn(&mut self, message: &str) -> String {
        let prompt = modules::frame_user_prompt(
            self.module,
            self.tool,
            !self.conversation_started,
            message,
        );
        self.conversation_started = true;
        self.turns.push(Turn::new(self.module, message));
        if self.turns.len() > MAX_TURN_HISTORY {
            let overflow = self.turns.len() - MAX_TURN_HISTORY;
            self.turns.drain(0..overflow);
        }
        self.slot_scroll = [0; 3];
        self.panes_changed();
        prompt
    }

    pub fn current_turn(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    pub fn is_turn_streaming(&self) -> bool {
        self.current_turn().is_some_and(Turn::is_streaming)
    }

    pub fn current_panes(&self) -> Option<&PaneSet> {
        self.current_turn().map(Turn::panes)
    }

    pub fn on_agent_output(&mut self, chunk: &str) {
        if let Some(turn) = self.turns.last_mut() {
            turn.push_output(chunk);
        }
        self.panes_changed();
    }

    pub fn on_agent_completed(&mut self, success: bool, code: i32) {
        let Some(turn) = self.turns.last_mut() else {
            return;
        };
        if !turn.is_streaming() {
            return;
        }
        if success {
            turn.complete();
        } else {
            turn.fail(&format!("backend exited with code {code}"));
        }
        let summary = completion_summary(turn);
        self.panes_changed();
        self.push_agent_message(summary);
    }

    pub fn start_new_conversation(&mut self) {
        self.conversation_started = false;
        self.turns.clear();
        self.slot_scroll = [0; 3];
        self.panes_changed();
        self.push_agent_message("System: Started a new conversation.");
    }

    /// Body lines of a slot at `width`, built by `build` only when the panes changed since
    /// the last call for that slot and width.
    pub fn slot_body_lines(
        &self,
        position: SlotPosition,
        width: u16,
        build: impl FnOnce() -> Vec<Line<'static>>,
    ) -> Arc<Vec<Line<'static>>> {
        let mut cache = self.slot_body_cache.borrow_mut();
        let entry = &mut cache[position.index()];
        if let Some(cached) = entry.as_ref()
            && cached.width == width
            && cached.generation == self.panes_generation
        {
            return Arc::clone(&cached.lines);
        }

        let lines = Arc::new(build());
        *entry = Some(SlotBodyCache {
            width,
            generation: self.panes_generation,
            lines: Arc::clone(&lines),
        });
        lines
    }

    fn panes_changed(&mut self) {
        self.panes_generation = self.panes_generation.wrapping_add(1);
    }

    /// Language and text of the slot that may be copied from the latest turn.
    pub fn copyable_slot(&self) -> Option<(String, String)> {
        let panes = self.current_panes()?;
        let slot = panes.copyable()?;
        let content = slot.copyable_content()?;
        let language = match &slot.render {
            crate::panes::RenderMode::SyntaxHighlighted { language } => language.clone(),
            _ => crate::parser::DEFAULT_CODE_LANGUAGE.to_string(),
        };
        Some((language, content.to_string()))
    }

    fn clear_input(&mut self) {
        self.chat_input.clear();
        self.chat_cursor = 0;
        self.chat_cursor_goal_col = None;
    }
}

fn completion_summary(turn: &Turn) -> String {
    match turn.status() {
        TurnStatus::Failed => format!("Agent: {}", crate::turn::FAILURE_MESSAGE),
        _ => {
            let panes = turn.panes();
            let filled: Vec<&str> = panes
                .slots
                .iter()
                .filter(|slot| slot.has_content())
                .map(|slot| slot.title.as_str())
                .collect();
            if filled.is_empty() {
                "Agent: (empty response)".to_string()
            } else {
                format!(
                    "Agent: {} response ready for \"{}\": {}",
                    panes.shape.label(),
                    prompt_excerpt(turn.prompt()),
                    filled.join(", ")
                )
            }
        }
    }
}

/// First line of the prompt, cut to `PROMPT_EXCERPT_CHARS`.
fn prompt_excerpt(prompt: &str) -> String {
    let line = prompt.lines().next().unwrap_or_default().trim();
    if line.chars().count() <= PROMPT_EXCERPT_CHARS {
        return line.to_string();
    }
    let cut: String = line.chars().take(PROMPT_EXCERPT_CHARS).collect();
    format!("{}...", cut.trim_end())
}

fn char_to_byte_idx(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(byte_idx, _)| byte_idx)
        .unwrap_or_else(|| s.len())
}

fn nearest_index_for_line_col(positions: &[(u16, u16)], target_line: u16, goal_col: u16) -> usize {
    let mut best: Option<(usize, u16)> = None;
    let mut fallback: Option<usize> = None;

    for (idx, (line, col)) in positions.iter().copied().enumerate() {
        if line != target_line {
            continue;
        }
        if fallback.is_none() {
            fallback = Some(idx);
        }
        if col <= goal_col {
            best = match best {
                Some((_, best_col)) if best_col >= col => best,
                _ => Some((idx, col)),
            };
        }
    }

    if let Some((idx, _)) = best {
        idx
    } else {
        fallback.unwrap_or(positions.len().saturating_sub(1))
    }
}

fn command_query(input: &str) -> Option<&str> {
    let trimmed = input.trim_start();
    if !trimmed.starts_with('/') {
        return None;
    }
    Some(trimmed.split_whitespace().next().unwrap_or(trimmed))
}

#[cfg(test)]
#[path = "../tests/unit/app_tests.rs"]
mod tests;
