//! Modal and non-modal dialog.
//!
//! Parts: a `trigger` that toggles the dialog, an optional `backdrop`, the
//! `content` surface with its `title` and `description`, and a `close`
//! button.  Escape inside the content and a click on the backdrop close the
//! dialog unless disabled in [`DialogOptions`].
//!
//! # Example
//!
//! ```
//! use husk_core::InputEvent;
//! use husk_widgets::dialog::{self, create_dialog, DialogOptions};
//!
//! let core = create_dialog().create(&DialogOptions {
//!     id: "confirm".into(),
//!     ..Default::default()
//! });
//!
//! let trigger = core.logic().get_interaction_handlers("trigger");
//! trigger.trigger("click", &InputEvent::Click);
//! assert!(core.state().get_state().open);
//!
//! let content = core.logic().get_a11y_props("content");
//! assert_eq!(content.get("aria-labelledby").and_then(|v| v.as_str()), Some("confirm-title"));
//!
//! dialog::set_open(&core, false);
//! assert!(!core.state().get_state().open);
//! ```

use husk_core::{
    A11yProps, ComponentConfig, ComponentCore, ComponentFactory, ComponentMetadata, ElementSpec,
    InputEvent, Key, LogicLayer, Merge, Store, WcagLevel,
};

/// Event names understood by the dialog.
pub mod events {
    pub const OPEN: &str = "open";
    pub const CLOSE: &str = "close";
    pub const TOGGLE: &str = "toggle";
}

/// ARIA role of the content surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DialogRole {
    #[default]
    Dialog,
    /// For dialogs that interrupt with an urgent message.
    AlertDialog,
}

impl DialogRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialogRole::Dialog => "dialog",
            DialogRole::AlertDialog => "alertdialog",
        }
    }
}

/// Initial configuration for a dialog instance.
#[derive(Debug, Clone)]
pub struct DialogOptions {
    /// Prefix for the ids referenced by `aria-labelledby` and friends.
    pub id: String,
    pub open: bool,
    pub modal: bool,
    pub close_on_escape: bool,
    pub close_on_backdrop: bool,
    pub role: DialogRole,
}

impl Default for DialogOptions {
    fn default() -> Self {
        Self {
            id: "dialog".into(),
            open: false,
            modal: true,
            close_on_escape: true,
            close_on_backdrop: true,
            role: DialogRole::Dialog,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialogState {
    pub id: String,
    pub open: bool,
    pub modal: bool,
    pub close_on_escape: bool,
    pub close_on_backdrop: bool,
    pub role: DialogRole,
}

impl DialogState {
    pub fn content_id(&self) -> String {
        format!("{}-content", self.id)
    }

    pub fn title_id(&self) -> String {
        format!("{}-title", self.id)
    }

    pub fn description_id(&self) -> String {
        format!("{}-description", self.id)
    }

    fn data_state(&self) -> &'static str {
        if self.open {
            "open"
        } else {
            "closed"
        }
    }
}

impl From<&DialogOptions> for DialogState {
    fn from(options: &DialogOptions) -> Self {
        Self {
            id: options.id.clone(),
            open: options.open,
            modal: options.modal,
            close_on_escape: options.close_on_escape,
            close_on_backdrop: options.close_on_backdrop,
            role: options.role,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DialogPatch {
    pub open: Option<bool>,
    pub modal: Option<bool>,
    pub close_on_escape: Option<bool>,
    pub close_on_backdrop: Option<bool>,
}

impl DialogPatch {
    fn open(open: bool) -> Self {
        Self {
            open: Some(open),
            ..Default::default()
        }
    }
}

impl Merge for DialogState {
    type Patch = DialogPatch;

    fn merge(&mut self, patch: DialogPatch) {
        if let Some(open) = patch.open {
            self.open = open;
        }
        if let Some(modal) = patch.modal {
            self.modal = modal;
        }
        if let Some(v) = patch.close_on_escape {
            self.close_on_escape = v;
        }
        if let Some(v) = patch.close_on_backdrop {
            self.close_on_backdrop = v;
        }
    }
}

pub fn dialog_metadata() -> ComponentMetadata {
    ComponentMetadata::new("Dialog")
        .version("0.1.0")
        .role("dialog")
        .wcag_level(WcagLevel::AA)
        .pattern("dialog-modal")
        .shortcut("Escape", "Close the dialog")
        .shortcut("Tab", "Move focus within the dialog")
        .aria_attributes([
            "aria-modal",
            "aria-labelledby",
            "aria-describedby",
            "aria-haspopup",
            "aria-expanded",
            "aria-controls",
        ])
        .supports([events::OPEN, events::CLOSE, events::TOGGLE])
        .requires([events::CLOSE])
        .element("trigger", ElementSpec::new("button"))
        .element("backdrop", ElementSpec::new("div").optional())
        .element("content", ElementSpec::new("div").role("dialog"))
        .element("title", ElementSpec::new("h2"))
        .element("description", ElementSpec::new("p").optional())
        .element("close", ElementSpec::new("button").optional())
        .size("sm")
        .size("md")
        .size("lg")
}

fn dialog_logic(_: &Store<DialogState>, _: &DialogOptions) -> LogicLayer<DialogState> {
    LogicLayer::<DialogState, InputEvent>::builder()
        .on_event(events::OPEN, |s, _| (!s.open).then(|| DialogPatch::open(true)))
        .on_event(events::CLOSE, |s, _| s.open.then(|| DialogPatch::open(false)))
        .on_event(events::TOGGLE, |s, _| Some(DialogPatch::open(!s.open)))
        .with_a11y("trigger", |s| {
            A11yProps::new()
                .with("aria-haspopup", "dialog")
                .with("aria-expanded", s.open)
                .with("aria-controls", s.content_id())
        })
        .with_a11y("backdrop", |s| {
            A11yProps::new()
                .with("aria-hidden", true)
                .with("data-state", s.data_state())
        })
        .with_a11y("content", |s| {
            A11yProps::new()
                .with("id", s.content_id())
                .with("role", s.role.as_str())
                .with_opt("aria-modal", s.modal.then_some(true))
                .with("aria-labelledby", s.title_id())
                .with("aria-describedby", s.description_id())
                .with("tabindex", -1)
                .with("data-state", s.data_state())
        })
        .with_a11y("title", |s| A11yProps::new().with("id", s.title_id()))
        .with_a11y("description", |s| {
            A11yProps::new().with("id", s.description_id())
        })
        .with_a11y("close", |_| A11yProps::new().with("aria-label", "Close"))
        .with_interaction("trigger", "click", |_, _| Some(events::TOGGLE.into()))
        .with_interaction("close", "click", |_, _| Some(events::CLOSE.into()))
        .with_interaction("backdrop", "click", |s, _| {
            (s.open && s.close_on_backdrop).then(|| events::CLOSE.into())
        })
        .with_interaction("content", "keydown", |s, e| {
            (s.open && s.close_on_escape && e.is_key(&Key::Escape)).then(|| events::CLOSE.into())
        })
        .build()
}

/// Factory for dialog instances.
pub fn create_dialog() -> ComponentFactory<DialogState, InputEvent, DialogOptions> {
    ComponentFactory::new(ComponentConfig::new(
        "Dialog",
        |options: &DialogOptions| DialogState::from(options),
        dialog_logic,
        dialog_metadata(),
    ))
}

/// Controlled-prop setter: push an externally owned `open` value.
pub fn set_open(core: &ComponentCore<DialogState>, open: bool) {
    apply(core, DialogPatch::open(open));
}

pub fn set_modal(core: &ComponentCore<DialogState>, modal: bool) {
    apply(
        core,
        DialogPatch {
            modal: Some(modal),
            ..Default::default()
        },
    );
}

/// Controlled-prop setter for the two dismissal behaviors.
pub fn set_dismissal(
    core: &ComponentCore<DialogState>,
    close_on_escape: bool,
    close_on_backdrop: bool,
) {
    apply(
        core,
        DialogPatch {
            close_on_escape: Some(close_on_escape),
            close_on_backdrop: Some(close_on_backdrop),
            ..Default::default()
        },
    );
}

/// Merge `patch` into the state, skipping the write when nothing changes.
fn apply(core: &ComponentCore<DialogState>, patch: DialogPatch) {
    let next = core.state().with_state(|s| {
        let mut next = s.clone();
        next.merge(patch);
        (next != *s).then_some(next)
    });
    if let Some(next) = next {
        core.state().set_state(next);
    }
}
