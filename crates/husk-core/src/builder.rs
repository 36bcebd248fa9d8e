//! Fluent construction of a [`LogicLayer`].

use crate::a11y::A11yProps;
use crate::event::InputEvent;
use crate::logic::{EventName, LogicConfig, LogicLayer, Merge};
use crate::store::Store;
use std::rc::Rc;

/// Accumulates event handlers, a11y generators, interaction handlers and
/// lifecycle hooks, then produces a [`LogicLayer`] with [`build`](Self::build).
///
/// Each call only registers; registering the same key again replaces the
/// earlier entry.  The builder is `Clone` and `build` is a pure function of
/// what has been accumulated, so a cloned builder yields an equivalent layer.
///
/// # Example
///
/// ```
/// use husk_core::{A11yProps, InputEvent, LogicLayerBuilder, Merge, Store};
///
/// #[derive(Clone)]
/// struct Counter { value: i32 }
///
/// struct CounterPatch { value: Option<i32> }
///
/// impl Merge for Counter {
///     type Patch = CounterPatch;
///     fn merge(&mut self, patch: CounterPatch) {
///         if let Some(v) = patch.value { self.value = v; }
///     }
/// }
///
/// let logic = LogicLayerBuilder::<Counter, InputEvent>::new()
///     .on_event("increment", |s, _| Some(CounterPatch { value: Some(s.value + 1) }))
///     .with_a11y("display", |s| A11yProps::new().with("aria-label", format!("{}", s.value)))
///     .with_interaction("button", "click", |_, _| Some("increment".into()))
///     .build();
///
/// let store = Store::new(Counter { value: 0 });
/// logic.connect(&store);
/// logic.get_interaction_handlers("button").trigger("click", &InputEvent::Click);
/// assert_eq!(store.get_state().value, 1);
/// ```
pub struct LogicLayerBuilder<S: Merge + 'static, E: 'static = InputEvent> {
    config: LogicConfig<S, E>,
}

impl<S: Merge + 'static, E: 'static> Clone for LogicLayerBuilder<S, E> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
        }
    }
}

impl<S, E> Default for LogicLayerBuilder<S, E>
where
    S: Merge + Clone + 'static,
    E: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, E> LogicLayerBuilder<S, E>
where
    S: Merge + Clone + 'static,
    E: 'static,
{
    pub fn new() -> Self {
        Self {
            config: LogicConfig::default(),
        }
    }

    /// Handle `name` with `handler`, which returns a patch or `None`.
    pub fn on_event(
        mut self,
        name: impl Into<String>,
        handler: impl Fn(&S, Option<&E>) -> Option<S::Patch> + 'static,
    ) -> Self {
        self.config.events.insert(name.into(), Rc::new(handler));
        self
    }

    /// Compute attributes for `element_id` from state.
    pub fn with_a11y(
        mut self,
        element_id: impl Into<String>,
        generator: impl Fn(&S) -> A11yProps + 'static,
    ) -> Self {
        self.config.a11y.insert(element_id.into(), Rc::new(generator));
        self
    }

    /// React to `event_type` on `element_id`; return the event to dispatch.
    pub fn with_interaction(
        mut self,
        element_id: impl Into<String>,
        event_type: impl Into<String>,
        handler: impl Fn(&S, &E) -> Option<EventName> + 'static,
    ) -> Self {
        self.config
            .interactions
            .entry(element_id.into())
            .or_default()
            .insert(event_type.into(), Rc::new(handler));
        self
    }

    pub fn on_initialize(mut self, hook: impl Fn(&Store<S>) + 'static) -> Self {
        self.config.on_initialize = Some(Rc::new(hook));
        self
    }

    pub fn on_cleanup(mut self, hook: impl Fn() + 'static) -> Self {
        self.config.on_cleanup = Some(Rc::new(hook));
        self
    }

    /// The configuration accumulated so far.
    pub fn config(&self) -> &LogicConfig<S, E> {
        &self.config
    }

    pub fn build(self) -> LogicLayer<S, E> {
        LogicLayer::new(self.config)
    }
}
