//! Terminal input mapped onto UniPro actions.

use std::io;
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};

use crate::app::Pane;
use crate::modules::ModuleType;

const POLL_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    /// Whatever pane has focus.
    Focused,
    /// The focused slot, or the slot focused last when the chat has focus.
    Slots,
    /// The pane under the mouse pointer.
    Pointer { column: u16, row: u16 },
}

/// Keys that edit the chat input when it has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Char(char),
    Backspace,
    Left,
    Right,
    Up,
    Down,
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    Tick,
    Quit,
    FocusNext,
    FocusPrev,
    Focus(Pane),
    Scroll {
        target: ScrollTarget,
        direction: Direction,
    },
    Edit(EditKey),
    SelectModule(ModuleType),
    /// Steps through the utility tools, then back to none.
    CycleTool,
    SaveCode,
    NewConversation,
    Click {
        column: u16,
        row: u16,
    },
}

const fn scroll(target: ScrollTarget, direction: Direction) -> AppEvent {
    AppEvent::Scroll { target, direction }
}

/// Ctrl chords, checked before any plain key.
const CONTROL_BINDINGS: [(char, AppEvent); 6] = [
    ('c', AppEvent::Quit),
    ('q', AppEvent::Quit),
    ('s', AppEvent::SaveCode),
    ('n', AppEvent::NewConversation),
    ('u', scroll(ScrollTarget::Slots, Direction::Up)),
    ('d', scroll(ScrollTarget::Slots, Direction::Down)),
];

/// Alt+digit jumps straight to a pane.
const ALT_FOCUS_BINDINGS: [(char, Pane); 4] = [
    ('0', Pane::Chat),
    ('1', Pane::Slot1),
    ('2', Pane::Slot2),
    ('3', Pane::Slot3),
];

const TOOL_KEY: u8 = 7;

fn map_key_event(key_event: KeyEvent) -> Option<AppEvent> {
    if key_event.kind != KeyEventKind::Press {
        return None;
    }
    let modifiers = key_event.modifiers;

    if let KeyCode::Char(c) = key_event.code {
        if modifiers.contains(KeyModifiers::CONTROL) {
            return CONTROL_BINDINGS
                .iter()
                .find(|(key, _)| *key == c.to_ascii_lowercase())
                .map(|(_, event)| *event);
        }
        if modifiers.contains(KeyModifiers::ALT) {
            return ALT_FOCUS_BINDINGS
                .iter()
                .find(|(key, _)| *key == c)
                .map(|(_, pane)| AppEvent::Focus(*pane));
        }
    }

    let chorded = modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::CONTROL);
    let event = match key_event.code {
        KeyCode::Tab => AppEvent::FocusNext,
        KeyCode::BackTab => AppEvent::FocusPrev,
        KeyCode::Esc => AppEvent::Focus(Pane::Chat),
        KeyCode::Up if chorded => scroll(ScrollTarget::Focused, Direction::Up),
        KeyCode::Down if chorded => scroll(ScrollTarget::Focused, Direction::Down),
        KeyCode::PageUp => scroll(ScrollTarget::Slots, Direction::Up),
        KeyCode::PageDown => scroll(ScrollTarget::Slots, Direction::Down),
        KeyCode::F(TOOL_KEY) => AppEvent::CycleTool,
        KeyCode::F(n) => {
            let module = ModuleType::ALL.get(usize::from(n).checked_sub(1)?)?;
            AppEvent::SelectModule(*module)
        }
        KeyCode::Up => AppEvent::Edit(EditKey::Up),
        KeyCode::Down => AppEvent::Edit(EditKey::Down),
        KeyCode::Left => AppEvent::Edit(EditKey::Left),
        KeyCode::Right => AppEvent::Edit(EditKey::Right),
        KeyCode::Backspace => AppEvent::Edit(EditKey::Backspace),
        KeyCode::Enter => AppEvent::Edit(EditKey::Submit),
        KeyCode::Char(c) => AppEvent::Edit(EditKey::Char(c)),
        _ => return None,
    };
    Some(event)
}

fn map_mouse_event(mouse_event: MouseEvent) -> Option<AppEvent> {
    let (column, row) = (mouse_event.column, mouse_event.row);
    let pointer = ScrollTarget::Pointer { column, row };
    match mouse_event.kind {
        MouseEventKind::ScrollUp => Some(scroll(pointer, Direction::Up)),
        MouseEventKind::ScrollDown => Some(scroll(pointer, Direction::Down)),
        MouseEventKind::Down(MouseButton::Left) => Some(AppEvent::Click { column, row }),
        _ => None,
    }
}

/// Waits one poll interval for input. Returns `Tick` when nothing mapped arrived.
pub fn next_event() -> io::Result<AppEvent> {
    if !event::poll(POLL_INTERVAL)? {
        return Ok(AppEvent::Tick);
    }
    let mapped = match event::read()? {
        Event::Key(key_event) => map_key_event(key_event),
        Event::Mouse(mouse_event) => map_mouse_event(mouse_event),
        _ => None,
    };
    Ok(mapped.unwrap_or(AppEvent::Tick))
}
