//! Terminal adapter built on [`ratatui`] and [`crossterm`].
//!
//! [`TerminalAdapter`] turns a [`ComponentCore`](husk_core::ComponentCore)
//! into a [`TerminalComponent`]: a focus ring over the component's
//! interactive elements, a dirty flag fed by the store, and a renderer that
//! either calls your view function or draws a generic outline of every
//! element and its attributes.  [`run`] drives one in a real terminal.
//!
//! Key routing:
//!
//! | Input | Effect |
//! |-------|--------|
//! | `Tab` / `Shift+Tab` | Move focus, firing `blur` then `focus` |
//! | `Enter` / `Space` | `keydown`, then `click` on the focused element |
//! | Other keys | `keydown` on the focused element |
//! | Left click | `click` on the focused element |
//! | Paste | `change` on the focused element |
//! | `Ctrl+C`, quit key | Exit the run loop |

mod adapter;
mod event;
mod runtime;

pub use adapter::{ElementProps, TerminalAdapter, TerminalAdapterOptions, TerminalComponent, ViewFn};
pub use event::TerminalEvent;
pub use runtime::{run, run_core, TerminalError};
