use super::*;
use crate::panes::{ResponseShape, SlotState};

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        app.input_char(c);
    }
}

#[test]
fn default_state_is_running_with_chat_focused() {
    let app = App::default();
    assert!(app.running);
    assert_eq!(app.active_pane, Pane::Chat);
    assert_eq!(app.module(), ModuleType::Assignment);
    assert!(app.tool().is_none());
    assert!(app.current_turn().is_none());
    assert!(!app.is_turn_streaming());
}

#[test]
fn tick_and_quit_update_app_state() {
    let mut app = App::default();
    app.on_tick();
    app.on_tick();
    assert_eq!(app.ticks, 2);
    app.quit();
    assert!(!app.running);
}

#[test]
fn pane_focus_cycles_forward_and_backward() {
    let mut app = App::default();
    app.next_pane();
    assert_eq!(app.active_pane, Pane::Slot1);
    app.next_pane();
    assert_eq!(app.active_pane, Pane::Slot2);
    app.next_pane();
    assert_eq!(app.active_pane, Pane::Slot3);
    app.next_pane();
    assert_eq!(app.active_pane, Pane::Chat);

    app.prev_pane();
    assert_eq!(app.active_pane, Pane::Slot3);
    app.prev_pane();
    assert_eq!(app.active_pane, Pane::Slot2);
}

#[test]
fn global_scroll_targets_last_focused_slot() {
    let mut app = App::default();
    assert_eq!(app.scroll_target_slot(), SlotPosition::Slot1);
    app.set_active_pane(Pane::Slot3);
    app.set_active_pane(Pane::Chat);
    assert_eq!(app.scroll_target_slot(), SlotPosition::Slot3);
}

#[test]
fn slot_scroll_is_bounded_and_independent() {
    let mut app = App::default();
    for _ in 0..50 {
        app.scroll_slot_down(SlotPosition::Slot2, 5, 12);
    }
    assert_eq!(app.slot_scroll(SlotPosition::Slot2), 12);
    assert_eq!(app.slot_scroll(SlotPosition::Slot1), 0);
    app.scroll_slot_up(SlotPosition::Slot2, 5);
    assert_eq!(app.slot_scroll(SlotPosition::Slot2), 7);
    app.scroll_slot_up(SlotPosition::Slot2, 50);
    assert_eq!(app.slot_scroll(SlotPosition::Slot2), 0);
}

#[test]
fn chat_input_and_submit_flow() {
    let mut app = App::default();
    app.input_char('h');
    app.input_char('i');
    assert_eq!(app.chat_input(), "hi");
    assert_eq!(app.chat_cursor_line_col(200), (0, 2));
    app.backspace_input();
    assert_eq!(app.chat_input(), "h");
    assert_eq!(app.submit_chat_message(), Some("h".to_string()));

    assert!(app.chat_input().is_empty());
    assert_eq!(app.chat_cursor_line_col(200), (0, 0));
    assert_eq!(app.chat_lines().last().expect("chat message expected"), "You: h");
}

#[test]
fn submit_ignores_whitespace_only_messages() {
    let mut app = App::default();
    type_text(&mut app, "   ");
    assert_eq!(app.submit_block_reason(), Some(SubmitBlockReason::Empty));
    assert_eq!(app.submit_chat_message(), None);
    assert!(app.chat_lines().is_empty());
}

#[test]
fn inserts_and_deletes_at_cursor_position() {
    let mut app = App::default();
    app.input_char('a');
    app.input_char('c');
    app.move_cursor_left();
    app.input_char('b');
    assert_eq!(app.chat_input(), "abc");
    assert_eq!(app.chat_cursor_line_col(200), (0, 2));
    app.backspace_input();
    assert_eq!(app.chat_input(), "ac");
    assert_eq!(app.chat_cursor_line_col(200), (0, 1));
}

#[test]
fn cursor_moves_up_and_down_over_wrapped_lines() {
    let mut app = App::default();
    type_text(&mut app, "abcdefghij");
    assert_eq!(app.chat_cursor_line_col(4), (2, 2));
    app.move_cursor_up(4);
    assert_eq!(app.chat_cursor_line_col(4), (1, 2));
    app.move_cursor_up(4);
    assert_eq!(app.chat_cursor_line_col(4), (0, 2));
    app.move_cursor_down(4);
    assert_eq!(app.chat_cursor_line_col(4), (1, 2));
}

#[test]
fn chat_scroll_helpers_are_bounded() {
    let mut app = App::default();
    app.scroll_chat_up();
    assert_eq!(app.chat_scroll(), 0);
    for _ in 0..200 {
        app.scroll_chat_down(2);
    }
    assert_eq!(app.chat_scroll(), 2);
}

#[test]
fn consume_chat_input_trimmed_clears_input_and_cursor() {
    let mut app = App::default();
    type_text(&mut app, " /x ");
    assert_eq!(app.consume_chat_input_trimmed().as_deref(), Some("/x"));
    assert!(app.chat_input().is_empty());
    assert_eq!(app.chat_cursor_line_col(200), (0, 0));
}

#[test]
fn command_index_filters_by_prefix() {
    let mut app = App::default();
    app.input_char('/');
    assert_eq!(app.command_suggestions().len(), COMMAND_INDEX.len());
    app.input_char('e');
    let suggestions = app.command_suggestions();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].command, "/exit");
    app.backspace_input();
    app.input_char('x');
    assert!(app.command_suggestions().is_empty());
    assert!(!app.should_show_command_index());
}

#[test]
fn command_index_tab_autocompletes_top_match() {
    let mut app = App::default();
    type_text(&mut app, "/sa");
    assert!(app.autocomplete_top_command());
    assert_eq!(app.chat_input(), "/save");
    assert_eq!(app.chat_cursor_line_col(200), (0, 5));
    assert!(!app.autocomplete_top_command());
}

#[test]
fn slash_commands_parse_with_arguments() {
    assert_eq!(
        SlashCommand::parse("/mode thesis"),
        Some(SlashCommand::Mode("thesis".to_string()))
    );
    assert_eq!(
        SlashCommand::parse("/tool  off "),
        Some(SlashCommand::Tool("off".to_string()))
    );
    assert_eq!(SlashCommand::parse("/save"), Some(SlashCommand::Save(None)));
    assert_eq!(
        SlashCommand::parse("/save out/solution.py"),
        Some(SlashCommand::Save(Some("out/solution.py".to_string())))
    );
    assert_eq!(SlashCommand::parse("/EXIT"), Some(SlashCommand::Quit));
    assert_eq!(SlashCommand::parse("/new"), Some(SlashCommand::New));
    assert_eq!(
        SlashCommand::parse("/start"),
        Some(SlashCommand::Unknown("/start".to_string()))
    );
    assert_eq!(SlashCommand::parse("explain /mode"), None);
}

#[test]
fn first_turn_names_module_and_later_turns_use_tool_frame() {
    let mut app = App::default();
    app.select_tool(Some(UtilityTool::Paraphraser));
    assert_eq!(app.module(), ModuleType::Utilities);

    let first = app.begin_turn("rewrite this");
    assert_eq!(first, "[User selected module: UTILITIES] rewrite this");
    app.on_agent_completed(true, 0);

    let second = app.begin_turn("and this");
    assert_eq!(
        second,
        "[Sub-Mode: PARAPHRASER] Apply this tool to the following request: and this"
    );
    assert_eq!(app.turn_count(), 2);
}

#[test]
fn leaving_utilities_clears_the_tool() {
    let mut app = App::default();
    app.select_tool(Some(UtilityTool::AiChecker));
    app.select_module(ModuleType::Organizer);
    assert!(app.tool().is_none());
    assert!(
        app.chat_lines()
            .iter()
            .any(|line| line.starts_with("System: Switched to Research Organizer."))
    );
}

#[test]
fn streaming_turn_blocks_messages_but_not_commands() {
    let mut app = App::default();
    app.begin_turn("sort a list");
    assert!(app.is_turn_streaming());
    type_text(&mut app, "another question");
    assert_eq!(
        app.submit_block_reason(),
        Some(SubmitBlockReason::TurnInProgress)
    );
    app.consume_chat_input_trimmed();
    type_text(&mut app, "/quit");
    assert_eq!(app.submit_block_reason(), None);
}

#[test]
fn agent_output_streams_into_current_turn() {
    let mut app = App::default();
    app.begin_turn("sort");
    app.on_agent_output("[START_THEORY]Merge sort[END_THEORY]\n");
    app.on_agent_output("[START_CODE_PYTHON]print(1)");
    let panes = app.current_panes().expect("turn should exist");
    assert_eq!(panes.shape, ResponseShape::Creation);
    assert_eq!(panes.slot(SlotPosition::Slot2).state, SlotState::Pending);

    app.on_agent_output("[END_CODE]\n");
    app.on_agent_completed(true, 0);
    assert!(!app.is_turn_streaming());
    assert_eq!(
        app.chat_lines().last().map(String::as_str),
        Some(
            "Agent: Creation response ready for \"sort\": Theory & Logic, Implementation (python)"
        )
    );
    assert_eq!(
        app.copyable_slot(),
        Some(("python".to_string(), "print(1)".to_string()))
    );
}

#[test]
fn failed_turn_reports_generic_failure() {
    let mut app = App::default();
    app.begin_turn("sort");
    app.on_agent_output("[START_THEORY]half");
    app.on_agent_completed(false, 1);
    let turn = app.current_turn().expect("turn should exist");
    assert_eq!(turn.status(), TurnStatus::Failed);
    assert_eq!(
        app.chat_lines().last().map(String::as_str),
        Some("Agent: Error: Could not reach UniPro servers.")
    );
    assert!(app.copyable_slot().is_none());
}

#[test]
fn completion_without_turn_is_ignored() {
    let mut app = App::default();
    app.on_agent_output("stray");
    app.on_agent_completed(true, 0);
    assert!(app.chat_lines().is_empty());
}

#[test]
fn new_conversation_clears_turns_and_reframes_first_prompt() {
    let mut app = App::default();
    app.begin_turn("one");
    app.on_agent_completed(true, 0);
    app.start_new_conversation();
    assert!(app.current_turn().is_none());
    let prompt = app.begin_turn("two");
    assert!(prompt.starts_with("[User selected module: ASSIGNMENT]"));
}

#[test]
fn utility_turn_has_nothing_to_copy() {
    let mut app = App::default();
    app.begin_turn("check");
    app.on_agent_output("[START_REFINED_TEXT]better[END_TEXT]");
    app.on_agent_completed(true, 0);
    assert!(app.copyable_slot().is_none());
}

#[test]
fn turn_history_is_capped() {
    let mut app = App::default();
    for idx in 0..(MAX_TURN_HISTORY + 5) {
        app.begin_turn(&format!("q{idx}"));
        app.on_agent_completed(true, 0);
    }
    assert_eq!(app.turn_count(), MAX_TURN_HISTORY);
    assert_eq!(
        app.current_turn().map(Turn::prompt),
        Some(format!("q{}", MAX_TURN_HISTORY + 4).as_str())
    );
}

#[test]
fn completion_summary_quotes_first_line_of_long_prompt() {
    let mut app = App::default();
    app.begin_turn("explain how quicksort partitions an array in place\nwith an example");
    app.on_agent_output("[START_THEORY]Pick a pivot.[END_THEORY]");
    app.on_agent_completed(true, 0);
    let expected = concat!(
        "Agent: Creation response ready for ",
        "\"explain how quicksort partitions...\": Theory & Logic"
    );
    assert_eq!(app.chat_lines().last().map(String::as_str), Some(expected));
}

#[test]
fn cycle_tool_walks_tools_then_clears() {
    let mut app = App::default();
    app.cycle_tool();
    assert_eq!(app.module(), ModuleType::Utilities);
    assert_eq!(app.tool(), Some(UtilityTool::AiChecker));
    for _ in 1..UtilityTool::ALL.len() {
        app.cycle_tool();
    }
    assert_eq!(app.tool(), Some(UtilityTool::Spinner));
    app.cycle_tool();
    assert_eq!(app.tool(), None);
    assert_eq!(app.module(), ModuleType::Utilities);
}

#[test]
fn slot_body_is_rebuilt_only_when_panes_or_width_change() {
    let mut app = App::default();
    app.begin_turn("sort");
    app.on_agent_output("[START_THEORY]Merge sort[END_THEORY]");
    let builds = std::cell::Cell::new(0);
    let build = || {
        builds.set(builds.get() + 1);
        vec![Line::from("body")]
    };

    let first = app.slot_body_lines(SlotPosition::Slot1, 40, build);
    let second = app.slot_body_lines(SlotPosition::Slot1, 40, build);
    assert_eq!(builds.get(), 1);
    assert!(std::sync::Arc::ptr_eq(&first, &second));

    app.slot_body_lines(SlotPosition::Slot1, 30, build);
    assert_eq!(builds.get(), 2);
    app.slot_body_lines(SlotPosition::Slot2, 30, build);
    assert_eq!(builds.get(), 3);

    app.on_agent_output("\n[START_CODE_PYTHON]print(1)");
    app.slot_body_lines(SlotPosition::Slot1, 30, build);
    assert_eq!(builds.get(), 4);

    app.start_new_conversation();
    app.begin_turn("again");
    app.slot_body_lines(SlotPosition::Slot1, 30, build);
    assert_eq!(builds.get(), 5);
}
