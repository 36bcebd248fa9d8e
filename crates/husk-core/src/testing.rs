use crate::a11y::{A11yProps, AttrValue};
use crate::adapter::Adapter;
use crate::component::{ComponentCore, ElementSnapshot};
use crate::error::{BoxError, CoreError};
use crate::event::InputEvent;
use crate::logic::Merge;
use crate::store::Unsubscribe;
use std::cell::Cell;
use std::rc::Rc;

/// An adapter that renders nothing and counts store notifications.
///
/// Its output, [`Recording`], stands in for a framework component: it stays
/// subscribed to the store until [`Recording::unmount`] is called or the core
/// is destroyed.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordingAdapter;

/// The "component" produced by [`RecordingAdapter`].
#[derive(Debug)]
pub struct Recording {
    renders: Rc<Cell<usize>>,
    subscription: Rc<Unsubscribe>,
}

impl Recording {
    /// Store notifications observed since the component was created.
    pub fn render_count(&self) -> usize {
        self.renders.get()
    }

    /// Stop observing the store.
    pub fn unmount(&self) {
        self.subscription.unsubscribe();
    }
}

impl<S, E> Adapter<S, E> for RecordingAdapter
where
    S: Merge + Clone + 'static,
    E: 'static,
{
    type Output = Recording;

    fn name(&self) -> &str {
        "recording"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn create_component(&self, core: &ComponentCore<S, E>) -> Result<Recording, BoxError> {
        let renders = Rc::new(Cell::new(0));
        let counter = Rc::clone(&renders);
        let subscription = core
            .state()
            .subscribe(move |_| counter.set(counter.get() + 1));
        Ok(Recording {
            renders,
            subscription: Rc::new(subscription),
        })
    }

    fn teardown(&self, recording: &Recording) -> Option<Box<dyn FnOnce()>> {
        let subscription = Rc::clone(&recording.subscription);
        Some(Box::new(move || subscription.unsubscribe()))
    }
}

/// A headless harness that drives a [`ComponentCore`] without any renderer.
///
/// `TestHarness` connects a [`RecordingAdapter`] so tests can assert on how
/// many times a real adapter would have re-rendered, and exposes the logic
/// layer's dispatch and query surface directly.  Dropping the harness
/// unmounts the recording and destroys the core.
///
/// # Example
///
/// ```rust,ignore
/// use husk_core::testing::TestHarness;
///
/// let harness = TestHarness::new(counter_factory.create(&0));
/// harness.dispatch("increment");
/// harness.fire("button", InputEvent::Click);
/// assert_eq!(harness.state().value, 2);
/// assert_eq!(harness.render_count(), 2);
/// ```
pub struct TestHarness<S: Merge + 'static, E: 'static = InputEvent> {
    core: ComponentCore<S, E>,
    recording: Recording,
}

impl<S, E> TestHarness<S, E>
where
    S: Merge + Clone + 'static,
    E: 'static,
{
    /// Connect a [`RecordingAdapter`] to `core`.
    ///
    /// # Panics
    ///
    /// If `core` has already been destroyed.
    pub fn new(core: ComponentCore<S, E>) -> Self {
        match Self::try_new(core) {
            Ok(harness) => harness,
            Err(err) => panic!("TestHarness could not connect: {err}"),
        }
    }

    pub fn try_new(core: ComponentCore<S, E>) -> Result<Self, CoreError> {
        let recording = core.connect(&RecordingAdapter)?;
        Ok(Self { core, recording })
    }

    pub fn core(&self) -> &ComponentCore<S, E> {
        &self.core
    }

    /// A copy of the current state.
    pub fn state(&self) -> S {
        self.core.state().get_state()
    }

    /// Dispatch a named event without a payload.
    pub fn dispatch(&self, event_name: &str) {
        self.core.logic().dispatch(event_name);
    }

    /// Dispatch a named event with a payload.
    pub fn send(&self, event_name: &str, payload: E) {
        self.core.logic().handle_event(event_name, Some(&payload));
    }

    /// Deliver a raw event to an element's interaction handler.
    ///
    /// Returns `false` when nothing is registered for that pair.
    pub fn trigger(&self, element_id: &str, event_type: &str, raw: &E) -> bool {
        self.core
            .logic()
            .get_interaction_handlers(element_id)
            .trigger(event_type, raw)
    }

    pub fn a11y(&self, element_id: &str) -> A11yProps {
        self.core.logic().get_a11y_props(element_id)
    }

    /// A single attribute of an element.
    pub fn attr(&self, element_id: &str, name: &str) -> Option<AttrValue> {
        self.a11y(element_id).get(name).cloned()
    }

    /// Store notifications since the harness connected.
    pub fn render_count(&self) -> usize {
        self.recording.render_count()
    }

    pub fn snapshot(&self) -> Vec<ElementSnapshot> {
        self.core.snapshot()
    }

    /// [`snapshot`](Self::snapshot) as pretty-printed JSON.
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.core.snapshot())
    }
}

impl<S> TestHarness<S, InputEvent>
where
    S: Merge + Clone + 'static,
{
    /// Deliver `event` to `element_id` under its own event type.
    pub fn fire(&self, element_id: &str, event: InputEvent) -> bool {
        self.trigger(element_id, event.event_type(), &event)
    }
}

impl<S: Merge + 'static, E: 'static> Drop for TestHarness<S, E> {
    fn drop(&mut self) {
        self.recording.unmount();
        self.core.destroy();
    }
}
