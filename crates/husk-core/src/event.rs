//! Framework-neutral raw input events.
//!
//! Adapters translate whatever their host framework delivers (DOM events,
//! terminal key presses, native callbacks) into [`InputEvent`] before handing
//! them to a logic layer's interaction handlers.  Widgets that need richer
//! payloads can use their own payload type instead; the logic layer is generic
//! over it.

use serde::{Deserialize, Serialize};

/// Interaction event type names used as keys in
/// [`LogicLayerBuilder::with_interaction`](crate::builder::LogicLayerBuilder::with_interaction).
pub mod event_types {
    pub const CLICK: &str = "click";
    pub const KEY_DOWN: &str = "keydown";
    pub const FOCUS: &str = "focus";
    pub const BLUR: &str = "blur";
    pub const POINTER_ENTER: &str = "pointerenter";
    pub const POINTER_LEAVE: &str = "pointerleave";
    pub const CHANGE: &str = "change";
    pub const LOAD: &str = "load";
    pub const ERROR: &str = "error";
}

/// A logical key, independent of any keyboard backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Enter,
    Escape,
    Space,
    Tab,
    BackTab,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Char(char),
}

/// Modifier keys held during a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Whether any modifier is held.
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// A raw input event delivered to an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Primary activation (mouse click, tap, Enter/Space on a button).
    Click,
    /// A key was pressed while the element had focus.
    KeyDown { key: Key, modifiers: Modifiers },
    Focus,
    Blur,
    PointerEnter,
    PointerLeave,
    /// The element's text value changed.
    Change(String),
    /// An item at the given index was chosen.
    Select(usize),
    /// A numeric value was set (sliders, progress).
    Value(f64),
    /// An external resource (image, media) finished loading.
    Load,
    /// An external resource failed to load.
    Error(String),
}

impl InputEvent {
    /// A key press with no modifiers.
    pub fn key(key: Key) -> Self {
        InputEvent::KeyDown {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    /// The interaction event type this event is routed under.
    pub fn event_type(&self) -> &'static str {
        match self {
            InputEvent::Click => event_types::CLICK,
            InputEvent::KeyDown { .. } => event_types::KEY_DOWN,
            InputEvent::Focus => event_types::FOCUS,
            InputEvent::Blur => event_types::BLUR,
            InputEvent::PointerEnter => event_types::POINTER_ENTER,
            InputEvent::PointerLeave => event_types::POINTER_LEAVE,
            InputEvent::Change(_) | InputEvent::Select(_) | InputEvent::Value(_) => {
                event_types::CHANGE
            }
            InputEvent::Load => event_types::LOAD,
            InputEvent::Error(_) => event_types::ERROR,
        }
    }

    /// Whether this is a press of `key` without modifiers.
    pub fn is_key(&self, key: &Key) -> bool {
        matches!(self, InputEvent::KeyDown { key: k, modifiers } if k == key && !modifiers.any())
    }

    /// The pressed key, if this is a key event.
    pub fn pressed_key(&self) -> Option<&Key> {
        match self {
            InputEvent::KeyDown { key, .. } => Some(key),
            _ => None,
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            InputEvent::Select(i) => Some(*i),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            InputEvent::Value(v) => Some(*v),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            InputEvent::Change(s) | InputEvent::Error(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_types_route_by_variant() {
        assert_eq!(InputEvent::Click.event_type(), "click");
        assert_eq!(InputEvent::key(Key::Escape).event_type(), "keydown");
        assert_eq!(InputEvent::Select(2).event_type(), "change");
        assert_eq!(InputEvent::Load.event_type(), "load");
    }

    #[test]
    fn is_key_ignores_modified_presses() {
        let plain = InputEvent::key(Key::Escape);
        let shifted = InputEvent::KeyDown {
            key: Key::Escape,
            modifiers: Modifiers {
                shift: true,
                ..Modifiers::NONE
            },
        };
        assert!(plain.is_key(&Key::Escape));
        assert!(!shifted.is_key(&Key::Escape));
        assert_eq!(shifted.pressed_key(), Some(&Key::Escape));
    }

    #[test]
    fn payload_accessors() {
        assert_eq!(InputEvent::Select(4).index(), Some(4));
        assert_eq!(InputEvent::Value(0.5).value(), Some(0.5));
        assert_eq!(InputEvent::Change("hi".into()).text(), Some("hi"));
        assert_eq!(InputEvent::Click.index(), None);
    }
}
