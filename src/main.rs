use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use crossterm::cursor::SetCursorStyle;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::*;

mod agent;
mod app;
mod artifact_io;
mod cli;
mod config;
mod events;
mod highlight;
mod logging;
mod modules;
mod panes;
mod parser;
mod protocol;
mod text_layout;
mod theme;
mod turn;
mod ui;

use agent::{AgentEvent, ModelSession};
use app::{App, Pane, SlashCommand, SubmitBlockReason};
use cli::{Cli, Commands};
use config::AppConfig;
use events::{AppEvent, Direction, EditKey, ScrollTarget};
use logging::LogLevelArg;
use modules::{ModuleType, UtilityTool};
use theme::Theme;

const GLOBAL_SLOT_SCROLL_LINES: u16 = 5;
const MAX_AGENT_EVENTS_PER_LOOP: usize = 128;

/// Whether a backend process is running, and whether its remaining events belong to a
/// conversation the user already discarded with `/new`.
#[derive(Debug, Default)]
struct BackendActivity {
    busy: bool,
    discarding: bool,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let config =
        AppConfig::load(cli.config.as_deref()).map_err(|err| io::Error::other(err.to_string()))?;
    let level = cli
        .log_level
        .or(config.logging.level)
        .unwrap_or(LogLevelArg::Off);
    if let Err(err) = logging::init(level.to_level_filter(), &config.log_file()) {
        eprintln!("warning: {err}; continuing without a log file");
    }

    if let Some(Commands::Parse { file, json }) = cli.command {
        return cli::run_parse(file.as_deref(), json);
    }

    let startup_message = match cli.send_file.as_deref() {
        Some(path) => Some(artifact_io::read_text_file(path)?),
        None => None,
    };
    let backend_config = config.backend_config(cli.backend, cli.model.as_deref());
    let session = ModelSession::with_config(backend_config);
    log::info!(
        "backend {} ({})",
        session.config().backend_kind().label(),
        session.config().program
    );
    let theme = config
        .theme_path()
        .map(Theme::load_or_default)
        .unwrap_or_default();
    let cwd = std::env::current_dir()?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        SetCursorStyle::SteadyBar
    )?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    let result = run_app(
        &mut terminal,
        App::default(),
        &theme,
        &session,
        &cwd,
        startup_message.as_deref(),
    );

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        SetCursorStyle::DefaultUserShape,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    theme: &Theme,
    session: &ModelSession,
    cwd: &Path,
    startup_message: Option<&str>,
) -> io::Result<()> {
    let mut activity = BackendActivity::default();
    app.push_agent_message(format!(
        "Agent: {} is ready. Pick a module with F1-F6 or /mode, then describe your task.",
        app.module().label()
    ));

    if let Some(message) = startup_message
        && let Some(message) = app.submit_direct_message(message)
    {
        submit_user_message(&mut app, session, &mut activity, cwd, message);
    }

    while app.running {
        let mut chat_updated = false;
        for event in session.drain_events_limited(MAX_AGENT_EVENTS_PER_LOOP) {
            if activity.discarding {
                if matches!(event, AgentEvent::Completed { .. }) {
                    activity = BackendActivity::default();
                }
                continue;
            }
            match event {
                AgentEvent::Output(chunk) => app.on_agent_output(&chunk),
                // Logged by the stderr reader; never part of the answer.
                AgentEvent::Diagnostic(_) => {}
                AgentEvent::System(line) => {
                    app.push_agent_message(format!("System: {line}"));
                    chat_updated = true;
                }
                AgentEvent::Completed { success, code } => {
                    activity.busy = false;
                    app.on_agent_completed(success, code);
                    chat_updated = true;
                }
            }
        }
        if chat_updated {
            let screen = screen_rect(terminal)?;
            let max_scroll = ui::chat_max_scroll(screen, &app);
            app.set_chat_scroll(max_scroll);
        }

        terminal.draw(|frame| ui::render(frame, &app, theme))?;

        let event = events::next_event()?;
        let screen = screen_rect(terminal)?;
        handle_app_event(&mut app, screen, session, &mut activity, cwd, event);
    }

    Ok(())
}

fn screen_rect(terminal: &Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<Rect> {
    let size = terminal.size()?;
    Ok(Rect::new(0, 0, size.width, size.height))
}

fn handle_app_event(
    app: &mut App,
    screen: Rect,
    session: &ModelSession,
    activity: &mut BackendActivity,
    cwd: &Path,
    event: AppEvent,
) {
    match event {
        AppEvent::Tick => app.on_tick(),
        AppEvent::Quit => app.quit(),
        AppEvent::FocusNext => {
            // Tab completes a slash command before it moves focus.
            if app.active_pane != Pane::Chat || !app.autocomplete_top_command() {
                app.next_pane();
            }
        }
        AppEvent::FocusPrev => app.prev_pane(),
        AppEvent::Focus(pane) => app.set_active_pane(pane),
        AppEvent::Scroll { target, direction } => {
            let (pane, lines) = match target {
                ScrollTarget::Focused => (app.active_pane, 1),
                ScrollTarget::Slots => (
                    Pane::from_slot(app.scroll_target_slot()),
                    GLOBAL_SLOT_SCROLL_LINES,
                ),
                ScrollTarget::Pointer { column, row } => (
                    ui::pane_hit_test(screen, app, column, row).unwrap_or(app.active_pane),
                    1,
                ),
            };
            scroll_pane(app, screen, pane, direction, lines);
        }
        AppEvent::Edit(key) if app.active_pane == Pane::Chat => {
            edit_chat_input(app, screen, session, activity, cwd, key);
        }
        AppEvent::Edit(EditKey::Up | EditKey::Char('k')) => {
            let pane = app.active_pane;
            scroll_pane(app, screen, pane, Direction::Up, 1);
        }
        AppEvent::Edit(EditKey::Down | EditKey::Char('j')) => {
            let pane = app.active_pane;
            scroll_pane(app, screen, pane, Direction::Down, 1);
        }
        AppEvent::Edit(_) => {}
        AppEvent::SelectModule(module) => app.select_module(module),
        AppEvent::CycleTool => app.cycle_tool(),
        AppEvent::SaveCode => save_copyable_slot(app, cwd, None),
        AppEvent::NewConversation => start_new_conversation(app, session, activity),
        AppEvent::Click { column, row } => {
            if let Some(pane) = ui::pane_hit_test(screen, app, column, row) {
                app.set_active_pane(pane);
            }
        }
    }
}

fn edit_chat_input(
    app: &mut App,
    screen: Rect,
    session: &ModelSession,
    activity: &mut BackendActivity,
    cwd: &Path,
    key: EditKey,
) {
    match key {
        EditKey::Char(c) => app.input_char(c),
        EditKey::Backspace => app.backspace_input(),
        EditKey::Left => app.move_cursor_left(),
        EditKey::Right => app.move_cursor_right(),
        EditKey::Up => {
            let width = ui::chat_input_text_width(screen, app);
            app.move_cursor_up(width);
        }
        EditKey::Down => {
            let width = ui::chat_input_text_width(screen, app);
            app.move_cursor_down(width);
        }
        EditKey::Submit => submit_chat_input(app, session, activity, cwd),
    }
}

fn submit_chat_input(
    app: &mut App,
    session: &ModelSession,
    activity: &mut BackendActivity,
    cwd: &Path,
) {
    let is_command = SlashCommand::parse(app.chat_input()).is_some();
    match app.submit_block_reason() {
        Some(SubmitBlockReason::Empty) => {}
        Some(SubmitBlockReason::TurnInProgress) => {
            app.push_agent_message(
                "System: A response is still streaming. Wait for it to finish or use /new.",
            );
        }
        None if activity.busy && !is_command => {
            app.push_agent_message(
                "System: The previous backend run is still stopping. Try again in a moment.",
            );
        }
        None => {
            // Commands are not echoed into the transcript.
            let message = if is_command {
                app.consume_chat_input_trimmed()
            } else {
                app.submit_chat_message()
            };
            if let Some(message) = message {
                submit_user_message(app, session, activity, cwd, message);
            }
        }
    }
}

fn scroll_pane(app: &mut App, screen: Rect, pane: Pane, direction: Direction, lines: u16) {
    match (pane.slot(), direction) {
        (Some(position), Direction::Up) => app.scroll_slot_up(position, lines),
        (Some(position), Direction::Down) => {
            let max_scroll = ui::slot_max_scroll(screen, app, position);
            app.scroll_slot_down(position, lines, max_scroll);
        }
        (None, Direction::Up) => app.scroll_chat_up(),
        (None, Direction::Down) => {
            let max_scroll = ui::chat_max_scroll(screen, app);
            app.scroll_chat_down(max_scroll);
        }
    }
}

fn submit_user_message(
    app: &mut App,
    session: &ModelSession,
    activity: &mut BackendActivity,
    cwd: &Path,
    message: String,
) {
    if let Some(command) = SlashCommand::parse(&message) {
        handle_slash_command(app, session, activity, cwd, command);
        return;
    }

    let intro_needed = session.starts_new_conversation();
    let prompt = app.begin_turn(&message);
    log::info!(
        "turn {} started in {} ({} chars)",
        app.turn_count(),
        app.module().id(),
        message.chars().count()
    );
    activity.busy = true;
    session.send_prompt(modules::with_session_intro(&prompt, intro_needed));
}

fn handle_slash_command(
    app: &mut App,
    session: &ModelSession,
    activity: &mut BackendActivity,
    cwd: &Path,
    command: SlashCommand,
) {
    match command {
        SlashCommand::Mode(name) => match ModuleType::from_name(&name) {
            Some(module) => app.select_module(module),
            None => app.push_agent_message(format!(
                "System: Unknown module '{name}'. Try one of: {}.",
                module_names()
            )),
        },
        SlashCommand::Tool(name) => {
            if name.eq_ignore_ascii_case("off") || name.eq_ignore_ascii_case("none") {
                app.select_tool(None);
            } else if let Some(tool) = UtilityTool::from_name(&name) {
                app.select_tool(Some(tool));
            } else {
                app.push_agent_message(format!(
                    "System: Unknown tool '{name}'. Try one of: {}, or off.",
                    tool_names()
                ));
            }
        }
        SlashCommand::New => start_new_conversation(app, session, activity),
        SlashCommand::Save(target) => save_copyable_slot(app, cwd, target.as_deref()),
        SlashCommand::Quit => app.quit(),
        SlashCommand::Unknown(name) => {
            app.push_agent_message(format!("System: Unknown command {name}."));
        }
    }
}

/// Drops the backend session; output still arriving from a running backend is discarded.
fn start_new_conversation(app: &mut App, session: &ModelSession, activity: &mut BackendActivity) {
    if activity.busy {
        activity.discarding = true;
    }
    session.reset_session();
    app.start_new_conversation();
}

fn save_copyable_slot(app: &mut App, cwd: &Path, target: Option<&str>) {
    let Some((language, content)) = app.copyable_slot() else {
        app.push_agent_message(
            "System: Nothing to save yet. Code, LaTeX and Markdown source panes can be saved.",
        );
        return;
    };
    let target = target.map(PathBuf::from);
    match artifact_io::save_pane_content(target.as_deref(), cwd, &language, &content) {
        Ok(path) => app.push_agent_message(format!("System: Saved {}.", path.display())),
        Err(err) => {
            log::warn!("save failed: {err}");
            app.push_agent_message(format!("System: Failed to save: {err}"));
        }
    }
}

fn module_names() -> String {
    ModuleType::ALL
        .iter()
        .map(|module| module.id().to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join(", ")
}

fn tool_names() -> String {
    UtilityTool::ALL
        .iter()
        .map(|tool| tool.id().to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join(", ")
}
