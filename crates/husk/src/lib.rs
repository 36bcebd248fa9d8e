//! **husk** -- headless UI components with pluggable rendering.
//!
//! This is the umbrella crate that re-exports everything you need from a
//! single dependency:
//!
//! ```toml
//! [dependencies]
//! husk = "0.1"
//! ```
//!
//! # Re-exports
//!
//! * All public items from [`husk_core`] are available at the crate root
//!   ([`Store`], [`LogicLayer`], [`ComponentFactory`], [`Adapter`], etc.).
//! * The [`widgets`] module re-exports everything from [`husk_widgets`]
//!   (dialog, stepper, progress bar and avatar).
//! * The [`tui`] module is the ratatui terminal adapter.
//! * [`ratatui`], [`crossterm`], and [`tokio`] are re-exported so downstream
//!   crates do not need to depend on them directly.
//!
//! # Quick start
//!
//! ```ignore
//! use husk::tui::{self, TerminalAdapter};
//! use husk::widgets::dialog::{self, DialogOptions};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), tui::TerminalError> {
//!     let core = dialog::create_dialog().create(&DialogOptions::default());
//!     tui::run_core(&core, &TerminalAdapter::new()).await
//! }
//! ```

mod logging;
pub mod tui;

pub use husk_core::*;
pub mod widgets {
    pub use husk_widgets::*;
}

pub use logging::{init_tracing, init_tracing_to_file};

// Re-export dependencies for use in demos and downstream crates
pub use crossterm;
pub use ratatui;
pub use tokio;
