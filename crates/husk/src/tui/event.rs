use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use husk_core::{InputEvent, Key, Modifiers};

/// Terminal events delivered to a [`TerminalComponent`](super::TerminalComponent).
///
/// Each variant wraps the corresponding [`crossterm::event::Event`] payload.
/// [`to_input`](TerminalEvent::to_input) translates the ones that have a
/// framework-neutral meaning into an [`InputEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalEvent {
    /// A keyboard event.
    Key(KeyEvent),
    /// A mouse event.
    Mouse(MouseEvent),
    /// Terminal resized to (columns, rows).
    Resize(u16, u16),
    /// Terminal window gained focus.
    FocusGained,
    /// Terminal window lost focus.
    FocusLost,
    /// Bracketed paste content.
    Paste(String),
}

impl From<crossterm::event::Event> for TerminalEvent {
    fn from(event: crossterm::event::Event) -> Self {
        match event {
            crossterm::event::Event::Key(k) => TerminalEvent::Key(k),
            crossterm::event::Event::Mouse(m) => TerminalEvent::Mouse(m),
            crossterm::event::Event::Resize(w, h) => TerminalEvent::Resize(w, h),
            crossterm::event::Event::FocusGained => TerminalEvent::FocusGained,
            crossterm::event::Event::FocusLost => TerminalEvent::FocusLost,
            crossterm::event::Event::Paste(s) => TerminalEvent::Paste(s),
        }
    }
}

impl TerminalEvent {
    /// A key press with no modifiers, mostly for tests.
    pub fn key(code: KeyCode) -> Self {
        TerminalEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    /// The neutral input this event stands for, if any.
    ///
    /// Key releases and repeats, mouse moves and resizes have no neutral
    /// meaning and yield `None`.
    pub fn to_input(&self) -> Option<InputEvent> {
        match self {
            TerminalEvent::Key(k) if k.kind == KeyEventKind::Press => {
                Some(InputEvent::KeyDown {
                    key: map_key(k.code)?,
                    modifiers: map_modifiers(k.modifiers),
                })
            }
            TerminalEvent::Key(_) => None,
            TerminalEvent::Mouse(m) => match m.kind {
                MouseEventKind::Down(MouseButton::Left) => Some(InputEvent::Click),
                _ => None,
            },
            TerminalEvent::FocusGained => Some(InputEvent::Focus),
            TerminalEvent::FocusLost => Some(InputEvent::Blur),
            TerminalEvent::Paste(s) => Some(InputEvent::Change(s.clone())),
            TerminalEvent::Resize(..) => None,
        }
    }
}

fn map_key(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Escape,
        KeyCode::Char(' ') => Key::Space,
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        _ => return None,
    })
}

fn map_modifiers(m: KeyModifiers) -> Modifiers {
    Modifiers {
        shift: m.contains(KeyModifiers::SHIFT),
        ctrl: m.contains(KeyModifiers::CONTROL),
        alt: m.contains(KeyModifiers::ALT),
        meta: m.contains(KeyModifiers::SUPER) || m.contains(KeyModifiers::META),
    }
}
