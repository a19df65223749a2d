use std::borrow::Cow;
use std::sync::Arc;

use ratatui::prelude::*;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Clear, Padding, Paragraph};

use crate::app::{App, CommandSuggestion, Pane};
use crate::highlight;
use crate::modules::ModuleType;
use crate::panes::{self, PaneSet, PaneSlot, RenderMode, SlotPosition, SlotState};
use crate::parser::ParsedRecord;
use crate::text_layout::{wrap_plain_lines, wrap_styled_line, wrap_word_with_positions};
use crate::theme::Theme;

const MAX_INPUT_TEXT_LINES: u16 = 5;
const TEXT_PADDING: u16 = 1;
const STATUS_HEIGHT: u16 = 3;
const TITLE_BAR_HEIGHT: u16 = 3;
const SIDEBAR_WIDTH: u16 = 34;
/// Below this width only the focused slot is drawn, with a tab strip.
const NARROW_WIDTH: u16 = 100;
const ACTIVE_TITLE_BG: Color = Color::Rgb(90, 145, 200);
const ACTIVE_TITLE_FG: Color = Color::Black;
const STATUS_HELP_TEXT: &str =
    "Tab/Alt+1-3 focus | F1-F6 module | F7 tool | PgUp/PgDn scroll | Ctrl+S save";

struct ScreenLayout {
    slots: [Option<Rect>; 3],
    tab_strip: bool,
    chat: Rect,
    sidebar: Option<Rect>,
    status: Rect,
}

fn screen_layout(screen: Rect, app: &App) -> ScreenLayout {
    let [body, status] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_HEIGHT)]).areas(screen);
    let [top, bottom] =
        Layout::vertical([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(body);

    if screen.width < NARROW_WIDTH {
        let mut slots = [None; 3];
        slots[app.scroll_target_slot().index()] = Some(top);
        return ScreenLayout {
            slots,
            tab_strip: true,
            chat: bottom,
            sidebar: None,
            status,
        };
    }

    let [slot1, slot2, slot3] = Layout::horizontal([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .areas(top);
    let [chat, sidebar] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(SIDEBAR_WIDTH)]).areas(bottom);
    ScreenLayout {
        slots: [Some(slot1), Some(slot2), Some(slot3)],
        tab_strip: false,
        chat,
        sidebar: Some(sidebar),
        status,
    }
}

fn split_title(area: Rect) -> (Rect, Rect) {
    let [title, content] =
        Layout::vertical([Constraint::Length(TITLE_BAR_HEIGHT), Constraint::Min(0)]).areas(area);
    (title, content)
}

pub fn chat_input_text_width(screen: Rect, app: &App) -> u16 {
    let (_title, content) = split_title(screen_layout(screen, app).chat);
    content.width.saturating_sub(TEXT_PADDING * 2).max(1)
}

pub fn chat_max_scroll(screen: Rect, app: &App) -> u16 {
    let (_title, content) = split_title(screen_layout(screen, app).chat);
    if content.width < 1 || content.height < 2 {
        return 0;
    }

    let input_text_width = content.width.saturating_sub(TEXT_PADDING * 2).max(1);
    let input_text_lines = wrap_word_with_positions(app.chat_input(), input_text_width).line_count;
    let max_input_height = content.height.saturating_sub(1).max(1);
    let (input_height, _) = input_box_metrics(input_text_lines, 0, max_input_height);
    let [messages_area, _input_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(input_height)]).areas(content);

    let visible_message_lines = messages_area.height.saturating_sub(TEXT_PADDING * 2);
    let total_message_lines = chat_display_lines(
        app.chat_lines(),
        content.width.saturating_sub(TEXT_PADDING * 2).max(1),
    )
    .len() as u16;
    total_message_lines.saturating_sub(visible_message_lines)
}

/// Furthest scroll offset for `position`, measured in the area that slot is drawn in.
pub fn slot_max_scroll(screen: Rect, app: &App, position: SlotPosition) -> u16 {
    let layout = screen_layout(screen, app);
    let shown = layout.slots.iter().flatten().next().copied();
    let Some(area) = layout.slots[position.index()].or(shown) else {
        return 0;
    };
    let (_title, content) = split_title(area);
    if content.width < 1 || content.height < 1 {
        return 0;
    }
    let text_width = content.width.saturating_sub(TEXT_PADDING * 2).max(1);
    let panes = displayed_panes(app);
    let theme = Theme::default();
    let body = slot_body(app, panes.slot(position), text_width, None, &theme);
    let total_lines = body.len() as u16;
    let visible_lines = content.height.saturating_sub(TEXT_PADDING * 2);
    total_lines.saturating_sub(visible_lines)
}

pub fn pane_hit_test(screen: Rect, app: &App, x: u16, y: u16) -> Option<Pane> {
    let layout = screen_layout(screen, app);
    for position in SlotPosition::ALL {
        if let Some(area) = layout.slots[position.index()]
            && point_in_rect(area, x, y)
        {
            return Some(Pane::from_slot(position));
        }
    }
    if point_in_rect(layout.chat, x, y) {
        return Some(Pane::Chat);
    }
    None
}

pub fn render(frame: &mut Frame, app: &App, theme: &Theme) {
    let layout = screen_layout(frame.area(), app);
    let panes = displayed_panes(app);
    let streaming = app.is_turn_streaming();

    for position in SlotPosition::ALL {
        if let Some(area) = layout.slots[position.index()] {
            render_slot_pane(
                frame,
                area,
                app,
                &panes,
                position,
                SlotPaneView {
                    active: app.active_pane == Pane::from_slot(position),
                    tab_strip: layout.tab_strip,
                    pulse: (streaming && position == SlotPosition::Slot1).then_some(app.ticks),
                    scroll: app.slot_scroll(position),
                },
                theme,
            );
        }
    }
    render_chat_pane(frame, layout.chat, app, app.active_pane == Pane::Chat, theme);
    if let Some(sidebar) = layout.sidebar {
        render_module_sidebar(frame, sidebar, app, theme);
    }

    frame.render_widget(
        Block::default().style(Style::default().bg(theme.status_bg)),
        layout.status,
    );
    let help = Paragraph::new(status_line_text(app))
        .style(Style::default().bg(theme.status_bg).fg(theme.muted_fg))
        .block(
            Block::default()
                .style(Style::default().bg(theme.status_bg))
                .padding(Padding::uniform(TEXT_PADDING)),
        );
    frame.render_widget(help, layout.status);
}

/// Panes of the latest turn, or the empty creation layout before the first message.
fn displayed_panes(app: &App) -> Cow<'_, PaneSet> {
    match app.current_panes() {
        Some(panes) => Cow::Borrowed(panes),
        None => Cow::Owned(panes::resolve(&ParsedRecord::default())),
    }
}

struct SlotPaneView {
    active: bool,
    tab_strip: bool,
    pulse: Option<u64>,
    scroll: u16,
}

fn render_slot_pane(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    panes: &PaneSet,
    position: SlotPosition,
    view: SlotPaneView,
    theme: &Theme,
) {
    let slot = panes.slot(position);
    let (title_area, content_area) = split_title(area);
    let title_bg = title_bar_bg(theme.slot_bg, view.active);
    let title_fg = if view.active {
        ACTIVE_TITLE_FG
    } else {
        theme.muted_fg
    };

    let title_line = if view.tab_strip {
        tab_strip_line(panes, position, title_bg, title_fg, theme)
    } else {
        Line::from(Span::styled(slot_title(slot), Style::default().fg(title_fg)))
    };
    frame.render_widget(
        Block::default().style(Style::default().bg(title_bg)),
        title_area,
    );
    frame.render_widget(
        Paragraph::new(title_line)
            .style(Style::default().bg(title_bg).fg(title_fg))
            .block(
                Block::default()
                    .style(Style::default().bg(title_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        title_area,
    );

    let width = content_area.width.saturating_sub(TEXT_PADDING * 2).max(1);
    let body = slot_body(app, slot, width, view.pulse, theme);
    let visible = content_area.height.saturating_sub(TEXT_PADDING * 2);
    let max_scroll = (body.len() as u16).saturating_sub(visible);
    let lines: Vec<Line<'static>> = body
        .iter()
        .skip(usize::from(view.scroll.min(max_scroll)))
        .take(usize::from(visible))
        .cloned()
        .collect();
    let body_fg = match slot.render {
        RenderMode::RawPreformatted => theme.terminal_fg,
        _ => theme.text_fg,
    };
    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .style(Style::default().bg(theme.slot_bg).fg(body_fg))
            .block(
                Block::default()
                    .style(Style::default().bg(theme.slot_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        content_area,
    );
}

fn slot_title(slot: &PaneSlot) -> String {
    let mut title = format!("{} {}", slot.icon.glyph(), slot.title);
    if slot.state == SlotState::Pending {
        title.push_str(" · streaming");
    }
    if slot.copyable_content().is_some() {
        title.push_str(" · /save");
    }
    title
}

fn tab_strip_line(
    panes: &PaneSet,
    shown: SlotPosition,
    title_bg: Color,
    title_fg: Color,
    theme: &Theme,
) -> Line<'static> {
    let mut spans = Vec::new();
    for slot in &panes.slots {
        if !spans.is_empty() {
            spans.push(Span::styled(" | ", Style::default().fg(theme.muted_fg)));
        }
        let mut label = slot.short_label.to_string();
        if slot.state == SlotState::Pending {
            label.push('*');
        }
        let style = if slot.position == shown {
            Style::default()
                .bg(title_bg)
                .fg(title_fg)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(theme.muted_fg)
        };
        spans.push(Span::styled(label, style));
    }
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        slot_title(panes.slot(shown)),
        Style::default().fg(title_fg),
    ));
    Line::from(spans)
}

/// Body lines of a slot, wrapped to `width` where the render mode allows it.
///
/// `pulse` carries the tick counter while the placeholder should animate. Content is
/// rendered through the app's per-slot cache and carries no theme colours.
fn slot_body(
    app: &App,
    slot: &PaneSlot,
    width: u16,
    pulse: Option<u64>,
    theme: &Theme,
) -> Arc<Vec<Line<'static>>> {
    match slot.content.as_deref() {
        Some(content) => app.slot_body_lines(slot.position, width, || {
            content_lines(content, &slot.render, width)
        }),
        None => Arc::new(placeholder_lines(slot, width, pulse, theme)),
    }
}

fn content_lines(content: &str, render: &RenderMode, width: u16) -> Vec<Line<'static>> {
    match render {
        RenderMode::MarkdownProse => markdown_lines(content, width),
        RenderMode::SyntaxHighlighted { language } => highlight::highlight_block(content, language),
        RenderMode::PlainProse => content
            .lines()
            .flat_map(|line| wrap_plain_lines(line, width))
            .map(Line::from)
            .collect(),
        RenderMode::RawPreformatted => content
            .lines()
            .map(|line| Line::from(line.to_string()))
            .collect(),
    }
}

fn markdown_lines(content: &str, width: u16) -> Vec<Line<'static>> {
    let text = tui_markdown::from_str(content);
    text.lines
        .iter()
        .flat_map(|line| wrap_styled_line(line, width))
        .collect()
}

fn placeholder_lines(
    slot: &PaneSlot,
    width: u16,
    pulse: Option<u64>,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let base = match slot.render {
        RenderMode::RawPreformatted => Style::default().fg(theme.terminal_fg),
        _ => Style::default().fg(theme.muted_fg),
    };
    let style = match pulse {
        Some(ticks) if (ticks / 4) % 2 == 1 => base.add_modifier(Modifier::BOLD),
        Some(_) => base.add_modifier(Modifier::DIM),
        None => base.add_modifier(Modifier::ITALIC),
    };
    wrap_plain_lines(slot.placeholder, width)
        .into_iter()
        .map(|line| Line::from(Span::styled(line, style)))
        .collect()
}

fn render_module_sidebar(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let (title_area, content_area) = split_title(area);
    let title_bg = title_bar_bg(theme.sidebar_bg, false);
    frame.render_widget(
        Paragraph::new("Modules")
            .style(Style::default().bg(title_bg).fg(theme.muted_fg))
            .block(
                Block::default()
                    .style(Style::default().bg(title_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        title_area,
    );

    let width = content_area.width.saturating_sub(TEXT_PADDING * 2).max(1);
    frame.render_widget(
        Paragraph::new(Text::from(sidebar_lines(app, width, theme)))
            .style(Style::default().bg(theme.sidebar_bg).fg(theme.text_fg))
            .block(
                Block::default()
                    .style(Style::default().bg(theme.sidebar_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        content_area,
    );
}

fn sidebar_lines(app: &App, width: u16, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (idx, module) in ModuleType::ALL.into_iter().enumerate() {
        let active = module == app.module();
        let marker = if active { ">" } else { " " };
        let style = if active {
            Style::default()
                .fg(theme.accent_fg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text_fg)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker} F{} ", idx + 1), Style::default().fg(theme.muted_fg)),
            Span::styled(module.label().to_string(), style),
        ]));
    }
    lines.push(Line::default());
    if app.module() == ModuleType::Utilities {
        let tool = app.tool().map_or("none (F7 or /tool)", |tool| tool.label());
        lines.push(Line::from(vec![
            Span::styled("Tool: ", Style::default().fg(theme.muted_fg)),
            Span::styled(tool.to_string(), Style::default().fg(theme.active_fg)),
        ]));
        lines.push(Line::default());
    }
    for line in wrap_plain_lines(app.module().description(), width) {
        lines.push(Line::from(Span::styled(
            line,
            Style::default().fg(theme.muted_fg),
        )));
    }
    lines
}

fn status_line_text(app: &App) -> String {
    if let Some(turn) = app.current_turn().filter(|turn| turn.is_streaming()) {
        let mut text = format!(
            "{} | {} working {} {} bytes",
            STATUS_HELP_TEXT,
            turn.module().label(),
            working_dots(app.ticks),
            turn.raw_text().len()
        );
        let pending = turn.record().pending_fields();
        if !pending.is_empty() {
            let names: Vec<String> = pending.iter().map(|field| format!("{field:?}")).collect();
            text.push_str(&format!(", receiving {}", names.join(", ")));
        }
        text
    } else {
        format!("{} | {}", STATUS_HELP_TEXT, app.module().label())
    }
}

fn working_dots(ticks: u64) -> &'static str {
    const FRAMES: [&str; 6] = ["[   ]", "[.  ]", "[.. ]", "[...]", "[ ..]", "[  .]"];
    FRAMES[((ticks / 2) as usize) % FRAMES.len()]
}

fn render_chat_pane(frame: &mut Frame, area: Rect, app: &App, active: bool, theme: &Theme) {
    let (title_area, content) = split_title(area);
    let title_bg = title_bar_bg(theme.chat_bg, active);
    let title_fg = if active {
        ACTIVE_TITLE_FG
    } else {
        theme.muted_fg
    };
    frame.render_widget(
        Block::default().style(Style::default().bg(title_bg)),
        title_area,
    );
    frame.render_widget(
        Paragraph::new("Chat")
            .style(Style::default().bg(title_bg).fg(title_fg))
            .block(
                Block::default()
                    .style(Style::default().bg(title_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        title_area,
    );

    frame.render_widget(
        Block::default().style(Style::default().bg(theme.chat_bg)),
        content,
    );
    if content.width < 1 || content.height < 2 {
        return;
    }

    let input_text_width = content.width.saturating_sub(TEXT_PADDING * 2).max(1);
    let wrapped_input_layout = wrap_word_with_positions(app.chat_input(), input_text_width);
    let input_text_lines = wrapped_input_layout.line_count;
    let (cursor_line, cursor_col) = app.chat_cursor_line_col(input_text_width.max(1));
    let max_input_height = content.height.saturating_sub(1).max(1);
    let (input_height, input_scroll) =
        input_box_metrics(input_text_lines, cursor_line, max_input_height);

    let [messages_area, input_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(input_height)]).areas(content);

    let message_lines = chat_display_lines(
        app.chat_lines(),
        messages_area.width.saturating_sub(TEXT_PADDING * 2).max(1),
    );
    let message_text = chat_text(&message_lines, theme);
    let messages = Paragraph::new(message_text)
        .scroll((app.chat_scroll().min(chat_max_scroll(frame.area(), app)), 0))
        .style(Style::default().bg(theme.chat_bg).fg(theme.text_fg))
        .block(
            Block::default()
                .style(Style::default().bg(theme.chat_bg))
                .padding(Padding::uniform(TEXT_PADDING)),
        );
    frame.render_widget(messages, messages_area);

    let input = Paragraph::new(wrapped_input_layout.rendered)
        .block(
            Block::default()
                .style(Style::default().bg(theme.input_bg))
                .padding(Padding::uniform(TEXT_PADDING)),
        )
        .style(Style::default().bg(theme.input_bg).fg(theme.text_fg))
        .scroll((input_scroll, 0));
    frame.render_widget(input, input_area);
    if app.should_show_command_index() {
        render_command_index(
            frame,
            app.command_suggestions(),
            messages_area,
            input_area,
            theme,
        );
    }

    if active {
        let input_inner = input_area.inner(Margin {
            horizontal: TEXT_PADDING,
            vertical: TEXT_PADDING,
        });
        if input_inner.width > 0 && input_inner.height > 0 {
            let visible_cursor_line = cursor_line.saturating_sub(input_scroll);
            if visible_cursor_line < input_inner.height {
                frame.set_cursor_position((
                    input_inner
                        .x
                        .saturating_add(cursor_col.min(input_inner.width.saturating_sub(1))),
                    input_inner.y.saturating_add(visible_cursor_line),
                ));
            }
        }
    }
}

fn render_command_index(
    frame: &mut Frame,
    suggestions: Vec<CommandSuggestion>,
    messages_area: Rect,
    input_area: Rect,
    theme: &Theme,
) {
    if suggestions.is_empty() || messages_area.height == 0 || input_area.width == 0 {
        return;
    }
    let max_items = messages_area.height.saturating_sub(2).max(1) as usize;
    let shown = suggestions.into_iter().take(max_items).collect::<Vec<_>>();
    let overlay_height = (shown.len() as u16)
        .saturating_add(2)
        .min(messages_area.height.max(1));
    let y = input_area
        .y
        .saturating_sub(overlay_height)
        .max(messages_area.y);
    let overlay = Rect::new(input_area.x, y, input_area.width, overlay_height);

    let mut lines = Vec::with_capacity(shown.len() + 1);
    for (idx, item) in shown.iter().enumerate() {
        let style = if idx == 0 {
            Style::default().fg(theme.active_fg)
        } else {
            Style::default().fg(theme.text_fg)
        };
        lines.push(Line::from(vec![
            Span::styled(item.command.to_string(), style),
            Span::raw(" "),
            Span::styled(
                item.description.to_string(),
                Style::default().fg(theme.muted_fg),
            ),
        ]));
    }

    frame.render_widget(Clear, overlay);
    frame.render_widget(
        Paragraph::new(lines)
            .style(Style::default().bg(theme.input_bg))
            .block(
                Block::default()
                    .style(Style::default().bg(theme.input_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        overlay,
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChatPrefix {
    You,
    Agent,
    System,
}

#[derive(Debug, Clone)]
struct ChatDisplayLine {
    prefix: Option<ChatPrefix>,
    body: String,
    show_label: bool,
    is_separator: bool,
}

fn chat_display_lines(messages: &[String], width: u16) -> Vec<ChatDisplayLine> {
    let width = width.max(1);
    let mut out = Vec::new();
    for (idx, message) in messages.iter().enumerate() {
        let (prefix, body) = parse_chat_prefix_and_body(message);
        if let Some(prefix) = prefix {
            let label = chat_label(prefix);
            let prefix_width = label.chars().count() + 1;
            let body_width = (width as usize).saturating_sub(prefix_width).max(1) as u16;
            let wrapped = wrap_plain_lines(body, body_width);
            if let Some((first, rest)) = wrapped.split_first() {
                out.push(ChatDisplayLine {
                    prefix: Some(prefix),
                    body: first.clone(),
                    show_label: true,
                    is_separator: false,
                });
                for line in rest {
                    out.push(ChatDisplayLine {
                        prefix: Some(prefix),
                        body: line.clone(),
                        show_label: false,
                        is_separator: false,
                    });
                }
            }
        } else {
            for line in wrap_plain_lines(body, width) {
                out.push(ChatDisplayLine {
                    prefix: None,
                    body: line,
                    show_label: false,
                    is_separator: false,
                });
            }
        }

        if idx + 1 < messages.len() {
            out.push(ChatDisplayLine {
                prefix: None,
                body: "─".repeat(width as usize),
                show_label: false,
                is_separator: true,
            });
        }
    }
    out
}

fn chat_label(prefix: ChatPrefix) -> &'static str {
    match prefix {
        ChatPrefix::You => "You:",
        ChatPrefix::Agent => "Agent:",
        ChatPrefix::System => "System:",
    }
}

fn chat_text(lines: &[ChatDisplayLine], theme: &Theme) -> Text<'static> {
    let mut out_lines = Vec::with_capacity(lines.len());
    for line in lines {
        if line.is_separator {
            out_lines.push(Line::from(Span::styled(
                line.body.clone(),
                Style::default().fg(chat_separator_color(theme)),
            )));
            continue;
        }
        if let Some(prefix) = line.prefix {
            let (label_style, body_style) = match prefix {
                ChatPrefix::You => (
                    Style::default().fg(Color::Rgb(80, 190, 100)),
                    Style::default(),
                ),
                ChatPrefix::Agent => (
                    Style::default().fg(Color::Rgb(230, 150, 60)),
                    Style::default(),
                ),
                ChatPrefix::System => {
                    let style = Style::default()
                        .fg(theme.muted_fg)
                        .add_modifier(Modifier::DIM);
                    (style, style)
                }
            };
            let label = chat_label(prefix);
            if line.show_label {
                out_lines.push(Line::from(vec![
                    Span::styled(label.to_string(), label_style),
                    Span::raw(" "),
                    Span::styled(line.body.clone(), body_style),
                ]));
            } else {
                out_lines.push(Line::from(vec![
                    Span::raw(" ".repeat(label.chars().count() + 1)),
                    Span::styled(line.body.clone(), body_style),
                ]));
            }
        } else {
            out_lines.push(Line::from(Span::raw(line.body.clone())));
        }
    }
    Text::from(out_lines)
}

fn chat_separator_color(theme: &Theme) -> Color {
    match theme.chat_bg {
        Color::Rgb(r, g, b) => Color::Rgb(
            r.saturating_add(12),
            g.saturating_add(12),
            b.saturating_add(12),
        ),
        _ => theme.muted_fg,
    }
}

fn parse_chat_prefix_and_body(message: &str) -> (Option<ChatPrefix>, &str) {
    if let Some(rest) = message.strip_prefix("You:") {
        return (Some(ChatPrefix::You), rest.trim_start());
    }
    if let Some(rest) = message.strip_prefix("Agent:") {
        return (Some(ChatPrefix::Agent), rest.trim_start());
    }
    if let Some(rest) = message.strip_prefix("System:") {
        return (Some(ChatPrefix::System), rest.trim_start());
    }
    (None, message)
}

fn input_box_metrics(input_text_lines: u16, cursor_line: u16, max_input_height: u16) -> (u16, u16) {
    let capped_text_lines = input_text_lines.clamp(1, MAX_INPUT_TEXT_LINES);
    let desired_height = capped_text_lines.saturating_add(TEXT_PADDING * 2);
    let input_height = desired_height.clamp(1, max_input_height.max(1));
    let visible_text_lines = input_height.saturating_sub(TEXT_PADDING * 2).max(1);
    let max_scroll = input_text_lines.saturating_sub(visible_text_lines);
    let middle_line = visible_text_lines / 2;
    let input_scroll = cursor_line.saturating_sub(middle_line).min(max_scroll);
    (input_height, input_scroll)
}

fn title_bar_bg(base: Color, active: bool) -> Color {
    if active {
        return ACTIVE_TITLE_BG;
    }
    match base {
        Color::Rgb(r, g, b) => {
            let delta = -12;
            Color::Rgb(
                adjust_channel(r, delta),
                adjust_channel(g, delta),
                adjust_channel(b, delta),
            )
        }
        _ => base,
    }
}

fn point_in_rect(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x
        && x < rect.x.saturating_add(rect.width)
        && y >= rect.y
        && y < rect.y.saturating_add(rect.height)
}

fn adjust_channel(channel: u8, delta: i16) -> u8 {
    let value = channel as i16 + delta;
    value.clamp(0, 255) as u8
}

#[cfg(test)]
#[path = "../tests/unit/ui_tests.rs"]
mod tests;
