//! Event-driven behavior bound to a [`Store`].
//!
//! A [`LogicLayer`] answers two kinds of questions for a renderer:
//!
//! * **pull**: "which accessibility attributes does element `X` need right
//!   now?"  ([`get_a11y_props`](LogicLayer::get_a11y_props)), derived from the
//!   current state on every call;
//! * **push**: "element `X` just received raw event `Y`, what happens?"
//!   ([`get_interaction_handlers`](LogicLayer::get_interaction_handlers) and
//!   [`handle_event`](LogicLayer::handle_event)), which may update the state.
//!
//! Neither side knows how the widget is drawn, so the same behavior serves a
//! retained tree, a diffing renderer, or an immediate-mode terminal UI.
//!
//! All tables are keyed by plain strings.  A misspelled event name or element id
//! is not an error: it resolves to an empty map or a no-op.
//!
//! # Lifecycle
//!
//! ```text
//! build ──→ connect(store) ──→ initialize() ──→ … ──→ cleanup()
//!             ↑                                          │
//!             └──────────── connect(other) ──────────────┘
//! ```
//!
//! Until [`connect`](LogicLayer::connect) is called the layer is inert: every
//! query returns an empty map and events are dropped with a warning.

use crate::a11y::A11yProps;
use crate::builder::LogicLayerBuilder;
use crate::event::InputEvent;
use crate::store::Store;
use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::collections::{btree_map, BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::rc::Rc;

/// State that accepts partial updates.
///
/// Events are applied to a copy of the current state, hence the `Clone`
/// supertrait.  `Patch` is typically a struct of `Option` fields; [`merge`](Merge::merge)
/// overwrites only the fields that are set, so sibling fields survive an event.
///
/// ```
/// use husk_core::logic::Merge;
///
/// #[derive(Clone)]
/// struct Toggle { on: bool, label: String }
///
/// #[derive(Default)]
/// struct TogglePatch { on: Option<bool>, label: Option<String> }
///
/// impl Merge for Toggle {
///     type Patch = TogglePatch;
///
///     fn merge(&mut self, patch: TogglePatch) {
///         if let Some(on) = patch.on { self.on = on; }
///         if let Some(label) = patch.label { self.label = label; }
///     }
/// }
/// ```
pub trait Merge: Clone {
    type Patch: 'static;

    fn merge(&mut self, patch: Self::Patch);
}

/// Name of an event to dispatch, returned by interaction handlers.
pub type EventName = Cow<'static, str>;

/// `(state, payload) -> patch`.  `None` leaves the state untouched.
pub type EventHandler<S, E> = Rc<dyn Fn(&S, Option<&E>) -> Option<<S as Merge>::Patch>>;

/// `state -> attributes` for one element.
pub type A11yGenerator<S> = Rc<dyn Fn(&S) -> A11yProps>;

/// `(state, raw event) -> event to dispatch`.
pub type InteractionFn<S, E> = Rc<dyn Fn(&S, &E) -> Option<EventName>>;

pub type InitializeHook<S> = Rc<dyn Fn(&Store<S>)>;

pub type CleanupHook = Rc<dyn Fn()>;

/// The three dispatch tables and two lifecycle hooks of a logic layer.
///
/// Usually assembled through [`LogicLayerBuilder`] rather than by hand.
pub struct LogicConfig<S: Merge + 'static, E: 'static> {
    pub events: HashMap<String, EventHandler<S, E>>,
    pub a11y: HashMap<String, A11yGenerator<S>>,
    /// Element id to (event type to handler).
    pub interactions: HashMap<String, BTreeMap<String, InteractionFn<S, E>>>,
    pub on_initialize: Option<InitializeHook<S>>,
    pub on_cleanup: Option<CleanupHook>,
}

impl<S: Merge + 'static, E: 'static> Default for LogicConfig<S, E> {
    fn default() -> Self {
        Self {
            events: HashMap::new(),
            a11y: HashMap::new(),
            interactions: HashMap::new(),
            on_initialize: None,
            on_cleanup: None,
        }
    }
}

impl<S: Merge + 'static, E: 'static> Clone for LogicConfig<S, E> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
            a11y: self.a11y.clone(),
            interactions: self.interactions.clone(),
            on_initialize: self.on_initialize.clone(),
            on_cleanup: self.on_cleanup.clone(),
        }
    }
}

struct LogicInner<S: Merge + 'static, E: 'static> {
    config: LogicConfig<S, E>,
    store: RefCell<Option<Store<S>>>,
    initialized: Cell<bool>,
}

/// Behavior controller for one widget instance.
///
/// `LogicLayer` is a cheap handle; clones share the same connection, which is
/// what lets the callables returned by
/// [`get_interaction_handlers`](LogicLayer::get_interaction_handlers) dispatch
/// back into it long after the call.
pub struct LogicLayer<S: Merge + 'static, E: 'static = InputEvent> {
    inner: Rc<LogicInner<S, E>>,
}

impl<S: Merge + 'static, E: 'static> Clone for LogicLayer<S, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S, E> LogicLayer<S, E>
where
    S: Merge + Clone + 'static,
    E: 'static,
{
    /// Create a disconnected layer from an assembled configuration.
    pub fn new(config: LogicConfig<S, E>) -> Self {
        Self {
            inner: Rc::new(LogicInner {
                config,
                store: RefCell::new(None),
                initialized: Cell::new(false),
            }),
        }
    }

    /// Start a fluent [`LogicLayerBuilder`].
    pub fn builder() -> LogicLayerBuilder<S, E> {
        LogicLayerBuilder::new()
    }

    /// Bind this layer to `store`.
    ///
    /// If the layer is already connected, [`cleanup`](LogicLayer::cleanup)
    /// runs first, even when `store` is the same store.
    pub fn connect(&self, store: &Store<S>) {
        if self.is_connected() {
            tracing::debug!("logic layer reconnecting, cleaning up previous connection");
            self.cleanup();
        }
        *self.inner.store.borrow_mut() = Some(store.clone());
    }

    /// Run the `on_initialize` hook once.
    ///
    /// Does nothing when disconnected or already initialized.
    pub fn initialize(&self) {
        let Some(store) = self.store() else {
            tracing::debug!("initialize called before connect, ignoring");
            return;
        };
        if self.inner.initialized.replace(true) {
            return;
        }
        if let Some(hook) = &self.inner.config.on_initialize {
            hook(&store);
        }
    }

    /// Dispatch `event_name` with an optional payload.
    ///
    /// The handler sees the current state; a returned patch is shallow-merged
    /// into a copy of it and committed with [`Store::update_state`].  Handler
    /// panics propagate to the caller.
    pub fn handle_event(&self, event_name: &str, payload: Option<&E>) {
        let Some(store) = self.store() else {
            tracing::warn!(
                event = event_name,
                "event dispatched to a disconnected logic layer, ignoring"
            );
            return;
        };
        let Some(handler) = self.inner.config.events.get(event_name) else {
            tracing::debug!(event = event_name, "no handler registered for event");
            return;
        };

        let patch = store.with_state(|state| handler(state, payload));
        match patch {
            Some(patch) => {
                tracing::trace!(event = event_name, "applying state patch");
                store.update_state(move |prev| {
                    let mut next = prev.clone();
                    next.merge(patch);
                    next
                });
            }
            None => tracing::trace!(event = event_name, "handler returned no change"),
        }
    }

    /// Dispatch an event without a payload.
    pub fn dispatch(&self, event_name: &str) {
        self.handle_event(event_name, None);
    }

    /// Attributes for `element_id` given the current state.
    ///
    /// Empty when disconnected or when no generator is registered.
    pub fn get_a11y_props(&self, element_id: &str) -> A11yProps {
        let Some(store) = self.store() else {
            return A11yProps::new();
        };
        match self.inner.config.a11y.get(element_id) {
            Some(generator) => store.with_state(|state| generator(state)),
            None => A11yProps::new(),
        }
    }

    /// Callables for every event type registered under `element_id`.
    ///
    /// Invoking one with a raw event runs the interaction handler against the
    /// state at that moment; if it names an event, that event is dispatched
    /// with the raw event as payload.  Empty when disconnected or when nothing
    /// is registered.
    pub fn get_interaction_handlers(&self, element_id: &str) -> InteractionHandlers<E> {
        if !self.is_connected() {
            return InteractionHandlers::default();
        }
        let Some(table) = self.inner.config.interactions.get(element_id) else {
            return InteractionHandlers::default();
        };

        table
            .iter()
            .map(|(event_type, interaction)| {
                let layer = self.clone();
                let interaction = Rc::clone(interaction);
                let call: Rc<dyn Fn(&E)> =
                    Rc::new(move |raw: &E| layer.run_interaction(&interaction, raw));
                (event_type.clone(), call)
            })
            .collect()
    }

    /// Run the `on_cleanup` hook and drop the store reference.
    ///
    /// Does nothing unless the layer is initialized.
    pub fn cleanup(&self) {
        if !self.inner.initialized.get() {
            return;
        }
        if let Some(hook) = &self.inner.config.on_cleanup {
            hook();
        }
        *self.inner.store.borrow_mut() = None;
        self.inner.initialized.set(false);
    }

    pub fn is_connected(&self) -> bool {
        self.inner.store.borrow().is_some()
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.get()
    }

    /// The connected store, if any.
    pub fn store(&self) -> Option<Store<S>> {
        self.inner.store.borrow().clone()
    }

    /// Every element id with an a11y generator or interaction handlers, sorted.
    pub fn element_ids(&self) -> Vec<String> {
        let config = &self.inner.config;
        config
            .a11y
            .keys()
            .chain(config.interactions.keys())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Every event name with a handler, sorted.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.config.events.keys().cloned().collect();
        names.sort();
        names
    }

    fn run_interaction(&self, interaction: &InteractionFn<S, E>, raw: &E) {
        let Some(store) = self.store() else {
            tracing::warn!("interaction fired on a disconnected logic layer, ignoring");
            return;
        };
        let event = store.with_state(|state| interaction(state, raw));
        if let Some(event) = event.filter(|name| !name.is_empty()) {
            self.handle_event(&event, Some(raw));
        }
    }
}

impl<S: Merge + 'static, E: 'static> fmt::Debug for LogicLayer<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut events: Vec<&String> = self.inner.config.events.keys().collect();
        events.sort();
        f.debug_struct("LogicLayer")
            .field("connected", &self.inner.store.borrow().is_some())
            .field("initialized", &self.inner.initialized.get())
            .field("events", &events)
            .finish()
    }
}

/// Build a logic layer from an assembled configuration.
pub fn create_logic_layer<S, E>(config: LogicConfig<S, E>) -> LogicLayer<S, E>
where
    S: Merge + Clone + 'static,
    E: 'static,
{
    LogicLayer::new(config)
}

/// Bound interaction callables for one element, keyed by event type.
pub struct InteractionHandlers<E: 'static> {
    handlers: BTreeMap<String, Rc<dyn Fn(&E)>>,
}

impl<E: 'static> InteractionHandlers<E> {
    pub fn get(&self, event_type: &str) -> Option<&Rc<dyn Fn(&E)>> {
        self.handlers.get(event_type)
    }

    /// Invoke the handler for `event_type`; `false` if none is registered.
    pub fn trigger(&self, event_type: &str, raw: &E) -> bool {
        match self.handlers.get(event_type) {
            Some(handler) => {
                handler(raw);
                true
            }
            None => false,
        }
    }

    pub fn event_types(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn contains(&self, event_type: &str) -> bool {
        self.handlers.contains_key(event_type)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Rc<dyn Fn(&E)>> {
        self.handlers.iter()
    }
}

impl<E: 'static> Default for InteractionHandlers<E> {
    fn default() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }
}

impl<E: 'static> Clone for InteractionHandlers<E> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

impl<E: 'static> FromIterator<(String, Rc<dyn Fn(&E)>)> for InteractionHandlers<E> {
    fn from_iter<I: IntoIterator<Item = (String, Rc<dyn Fn(&E)>)>>(iter: I) -> Self {
        Self {
            handlers: iter.into_iter().collect(),
        }
    }
}

impl<E: 'static> fmt::Debug for InteractionHandlers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}
