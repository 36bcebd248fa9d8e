//! Reference widgets for the **husk** headless toolkit.
//!
//! Each widget is a state type, a `Patch` type implementing
//! [`husk_core::Merge`], a metadata constructor and a `create_*` function
//! returning a [`husk_core::ComponentFactory`].  None of them draws anything;
//! connect a core to an adapter to render it.
//!
//! # Widgets
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`avatar`] | Image avatar with load status and initials fallback |
//! | [`dialog`] | Modal or non-modal dialog with trigger, backdrop and close parts |
//! | [`progress`] | Determinate / indeterminate progress bar |
//! | [`stepper`] | Multi-step flow with linear gating and async validation |
//!
//! Externally controlled values (for example a dialog's `open` flag owned by
//! the host application) are pushed in through each module's setter
//! functions, such as [`dialog::set_open`].

pub mod avatar;
pub mod dialog;
pub mod progress;
pub mod stepper;

pub use avatar::create_avatar;
pub use dialog::create_dialog;
pub use progress::create_progress;
pub use stepper::create_stepper;
