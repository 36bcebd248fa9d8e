//! Core engine for the **husk** headless component toolkit.
//!
//! `husk-core` holds everything a widget needs to describe its behavior once
//! and be rendered by any number of frameworks.  A widget is its state, the
//! events that change it, and the accessibility attributes and input wiring
//! that follow from it.  How it is drawn is left to an [`Adapter`].
//!
//! # Key types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Store`] | Single observable value with synchronous listeners |
//! | [`LogicLayer`] | Event handlers, a11y generators and interaction handlers bound to a store |
//! | [`LogicLayerBuilder`] | Fluent assembly of a [`LogicLayer`] |
//! | [`ComponentFactory`] | Builds fresh [`ComponentCore`] instances from a [`ComponentConfig`] |
//! | [`ComponentCore`] | One live widget: store + logic + [`ComponentMetadata`] |
//! | [`Adapter`] | What a rendering framework implements to display a core |
//! | [`TestHarness`](testing::TestHarness) | Headless harness for unit-testing a widget without a renderer |
//!
//! # Data flow
//!
//! 1. **create** -- [`ComponentFactory::create`] builds the store from the
//!    widget's initial state and connects and initializes its logic layer.
//! 2. **connect** -- [`ComponentCore::connect`] hands the core to an adapter,
//!    which subscribes to the store and reads metadata and a11y props.
//! 3. **interact** -- The adapter routes raw input through
//!    [`LogicLayer::get_interaction_handlers`]; handlers name an event and
//!    [`LogicLayer::handle_event`] merges the resulting patch into the store.
//! 4. **re-render** -- The store notifies every subscriber, and each adapter
//!    redraws from the new state.
//! 5. **destroy** -- On permanent unmount the adapter calls
//!    [`ComponentCore::destroy`] exactly once.
//!
//! # Quick example
//!
//! ```
//! use husk_core::{
//!     A11yProps, ComponentConfig, ComponentFactory, ComponentMetadata, InputEvent,
//!     LogicLayer, Merge, Store,
//! };
//!
//! #[derive(Clone)]
//! struct Counter { value: i32 }
//!
//! struct CounterPatch { value: Option<i32> }
//!
//! impl Merge for Counter {
//!     type Patch = CounterPatch;
//!     fn merge(&mut self, patch: CounterPatch) {
//!         if let Some(v) = patch.value { self.value = v; }
//!     }
//! }
//!
//! let factory = ComponentFactory::new(ComponentConfig::new(
//!     "Counter",
//!     |_: &()| Counter { value: 0 },
//!     |_: &Store<Counter>, _: &()| {
//!         LogicLayer::<Counter, InputEvent>::builder()
//!             .on_event("increment", |s, _| Some(CounterPatch { value: Some(s.value + 1) }))
//!             .with_a11y("value", |s| A11yProps::new().with("aria-valuenow", s.value))
//!             .build()
//!     },
//!     ComponentMetadata::new("Counter"),
//! ));
//!
//! let core = factory.create(&());
//! core.logic().dispatch("increment");
//! assert_eq!(core.state().get_state().value, 1);
//! core.destroy();
//! ```

pub mod a11y;
pub mod adapter;
pub mod builder;
pub mod component;
pub mod error;
pub mod event;
pub mod logic;
pub mod metadata;
pub mod store;
pub mod testing;

pub use a11y::{A11yProps, AttrValue};
pub use adapter::Adapter;
pub use builder::LogicLayerBuilder;
pub use component::{
    create_component_factory, ComponentBuilder, ComponentConfig, ComponentCore,
    ComponentFactory, ElementSnapshot,
};
pub use error::{BoxError, CoreError};
pub use event::{event_types, InputEvent, Key, Modifiers};
pub use logic::{create_logic_layer, EventName, InteractionHandlers, LogicConfig, LogicLayer, Merge};
pub use metadata::{
    AccessibilityMetadata, ComponentMetadata, ElementSpec, EventsMetadata, StructureMetadata,
    WcagLevel,
};
pub use store::{derive_store, Store, Unsubscribe};
