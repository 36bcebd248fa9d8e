//! Multi-step flow with optional linear gating and async validation.
//!
//! The stepper tracks an ordered list of [`Step`]s, the current index and
//! which steps are completed.  In linear mode the user cannot jump past the
//! first incomplete step.  [`next_async`] runs a caller-supplied validation
//! future before advancing and refuses to start a second validation while one
//! is still pending.
//!
//! Elements: `root`, `steps` (the list), one `step-{index}` per step,
//! `previous` and `next`.

use husk_core::{
    A11yProps, ComponentConfig, ComponentCore, ComponentFactory, ComponentMetadata, CoreError,
    ElementSpec, InputEvent, Key, LogicLayer, LogicLayerBuilder, Merge, Store,
};
use std::collections::BTreeSet;
use std::future::Future;

/// Event names understood by the stepper.
pub mod events {
    pub const NEXT: &str = "next";
    pub const PREVIOUS: &str = "previous";
    /// Payload: [`InputEvent::Select`](husk_core::InputEvent::Select) with the target index.
    pub const GO_TO: &str = "goTo";
    pub const COMPLETE: &str = "complete";
    pub const RESET: &str = "reset";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub label: String,
    pub description: Option<String>,
    /// Optional steps never block linear navigation.
    pub optional: bool,
}

impl Step {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: None,
            optional: false,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct StepperOptions {
    pub steps: Vec<Step>,
    pub initial: usize,
    pub linear: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepperState {
    pub steps: Vec<Step>,
    pub current: usize,
    pub completed: BTreeSet<usize>,
    pub linear: bool,
    /// A [`next_async`] validation is pending.
    pub validating: bool,
}

impl StepperState {
    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.steps.len()
    }

    pub fn is_completed(&self, index: usize) -> bool {
        self.completed.contains(&index)
    }

    /// Every required step is completed.
    pub fn is_finished(&self) -> bool {
        self.steps
            .iter()
            .enumerate()
            .all(|(i, step)| step.optional || self.completed.contains(&i))
    }

    /// Furthest index reachable by a jump.
    ///
    /// In linear mode this is the first required step not yet completed;
    /// otherwise any step.
    pub fn furthest_reachable(&self) -> usize {
        let last = self.steps.len().saturating_sub(1);
        if !self.linear {
            return last;
        }
        self.steps
            .iter()
            .enumerate()
            .find(|(i, step)| !step.optional && !self.completed.contains(i))
            .map_or(last, |(i, _)| i)
    }

    pub fn can_go_to(&self, index: usize) -> bool {
        index < self.steps.len() && index <= self.furthest_reachable().max(self.current)
    }

    fn status(&self, index: usize) -> &'static str {
        if index == self.current {
            "current"
        } else if self.completed.contains(&index) {
            "completed"
        } else {
            "upcoming"
        }
    }
}

impl From<&StepperOptions> for StepperState {
    fn from(options: &StepperOptions) -> Self {
        Self {
            current: options.initial.min(options.steps.len().saturating_sub(1)),
            steps: options.steps.clone(),
            completed: BTreeSet::new(),
            linear: options.linear,
            validating: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StepperPatch {
    pub current: Option<usize>,
    pub completed: Option<BTreeSet<usize>>,
    pub validating: Option<bool>,
}

impl Merge for StepperState {
    type Patch = StepperPatch;

    fn merge(&mut self, patch: StepperPatch) {
        if let Some(current) = patch.current {
            self.current = current;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(validating) = patch.validating {
            self.validating = validating;
        }
    }
}

fn with_completed(s: &StepperState, index: usize) -> BTreeSet<usize> {
    let mut completed = s.completed.clone();
    completed.insert(index);
    completed
}

fn next(s: &StepperState) -> Option<StepperPatch> {
    if s.steps.is_empty() {
        return None;
    }
    let completed = with_completed(s, s.current);
    if s.is_last() {
        return (completed != s.completed).then(|| StepperPatch {
            completed: Some(completed),
            ..Default::default()
        });
    }
    Some(StepperPatch {
        current: Some(s.current + 1),
        completed: Some(completed),
        ..Default::default()
    })
}

fn go_to(s: &StepperState, payload: Option<&InputEvent>) -> Option<StepperPatch> {
    let index = payload.and_then(InputEvent::index)?;
    if index == s.current {
        return None;
    }
    if !s.can_go_to(index) {
        tracing::debug!(index, current = s.current, "stepper jump blocked");
        return None;
    }
    Some(StepperPatch {
        current: Some(index),
        ..Default::default()
    })
}

pub fn stepper_metadata() -> ComponentMetadata {
    ComponentMetadata::new("Stepper")
        .role("group")
        .pattern("stepper")
        .shortcut("ArrowRight", "Next step")
        .shortcut("ArrowLeft", "Previous step")
        .shortcut("Home", "First step")
        .aria_attributes(["aria-current", "aria-disabled", "aria-busy", "aria-label"])
        .supports([
            events::NEXT,
            events::PREVIOUS,
            events::GO_TO,
            events::COMPLETE,
            events::RESET,
        ])
        .element("root", ElementSpec::new("div").role("group"))
        .element("steps", ElementSpec::new("ol").role("list"))
        .element("previous", ElementSpec::new("button"))
        .element("next", ElementSpec::new("button"))
        .variant("horizontal")
        .variant("vertical")
}

fn stepper_logic(_: &Store<StepperState>, options: &StepperOptions) -> LogicLayer<StepperState> {
    let mut builder = LogicLayerBuilder::<StepperState, InputEvent>::new()
        .on_event(events::NEXT, |s, _| next(s))
        .on_event(events::PREVIOUS, |s, _| {
            (!s.is_first()).then(|| StepperPatch {
                current: Some(s.current - 1),
                ..Default::default()
            })
        })
        .on_event(events::GO_TO, go_to)
        .on_event(events::COMPLETE, |s, _| {
            (!s.is_completed(s.current)).then(|| StepperPatch {
                completed: Some(with_completed(s, s.current)),
                ..Default::default()
            })
        })
        .on_event(events::RESET, |_, _| {
            Some(StepperPatch {
                current: Some(0),
                completed: Some(BTreeSet::new()),
                validating: Some(false),
            })
        })
        .with_a11y("root", |s| {
            A11yProps::new()
                .with("role", "group")
                .with("aria-label", "Progress")
                .with_opt("aria-busy", s.validating.then_some(true))
        })
        .with_a11y("steps", |s| {
            A11yProps::new().with("aria-label", format!("Step {} of {}", s.current + 1, s.steps.len()))
        })
        .with_a11y("previous", |s| {
            A11yProps::new().with_opt("aria-disabled", s.is_first().then_some(true))
        })
        .with_a11y("next", |s| {
            A11yProps::new()
                .with_opt("aria-disabled", (s.validating || s.steps.is_empty()).then_some(true))
                .with_opt("aria-busy", s.validating.then_some(true))
        })
        .with_interaction("previous", "click", |_, _| Some(events::PREVIOUS.into()))
        .with_interaction("next", "click", |s, _| {
            (!s.validating).then(|| events::NEXT.into())
        })
        .with_interaction("steps", "change", |_, e| {
            e.index().map(|_| events::GO_TO.into())
        })
        .with_interaction("steps", "keydown", |s, e| match e.pressed_key()? {
            Key::Right | Key::Down if !s.validating => Some(events::NEXT.into()),
            Key::Left | Key::Up => Some(events::PREVIOUS.into()),
            _ => None,
        });

    for index in 0..options.steps.len() {
        builder = builder.with_a11y(format!("step-{index}"), move |s| {
            let label = s.steps.get(index).map(|step| step.label.as_str()).unwrap_or("");
            A11yProps::new()
                .with("aria-label", format!("Step {}: {}", index + 1, label))
                .with_opt("aria-current", (index == s.current).then_some("step"))
                .with_opt("aria-disabled", (!s.can_go_to(index)).then_some(true))
                .with("data-state", s.status(index))
        });
    }
    builder.build()
}

/// Factory for stepper instances.
pub fn create_stepper() -> ComponentFactory<StepperState, InputEvent, StepperOptions> {
    ComponentFactory::new(ComponentConfig::new(
        "Stepper",
        |options: &StepperOptions| StepperState::from(options),
        stepper_logic,
        stepper_metadata(),
    ))
}

/// Jump to `index`, honoring linear gating.
pub fn go_to_step(core: &ComponentCore<StepperState>, index: usize) {
    core.logic()
        .handle_event(events::GO_TO, Some(&InputEvent::Select(index)));
}

/// Errors from [`next_async`].
#[derive(Debug, thiserror::Error)]
pub enum StepperError {
    #[error("a step validation is already in progress")]
    ValidationInFlight,

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Validate the current step, then advance if the validator accepts it.
///
/// `validate` receives the current state and returns a future resolving to
/// `true` when the step may be left.  Returns `Ok(true)` if the stepper
/// advanced (or, on the last step, completed it) and `Ok(false)` if the
/// validator rejected the step or the current step changed while it ran.
///
/// The in-flight flag is cleared even if the returned future is dropped
/// before completion or the validator panics.
///
/// # Errors
///
/// [`StepperError::ValidationInFlight`] if another call has not finished
/// yet, and [`StepperError::Core`] if the component was destroyed.
pub async fn next_async<F, Fut>(
    core: &ComponentCore<StepperState>,
    validate: F,
) -> Result<bool, StepperError>
where
    F: FnOnce(StepperState) -> Fut,
    Fut: Future<Output = bool>,
{
    core.ensure_alive()?;
    let store = core.state();
    let snapshot = store.get_state();
    if snapshot.validating {
        return Err(StepperError::ValidationInFlight);
    }
    let step = snapshot.current;
    let guard = ValidationGuard::start(store);

    let accepted = validate(snapshot).await;

    drop(guard);
    core.ensure_alive()?;
    if !accepted {
        tracing::debug!(step, "step validation rejected");
        return Ok(false);
    }
    if store.with_state(|s| s.current) != step {
        tracing::debug!(step, "current step changed during validation, not advancing");
        return Ok(false);
    }
    core.logic().dispatch(events::NEXT);
    Ok(true)
}

/// Holds the `validating` flag for the lifetime of one [`next_async`] call.
struct ValidationGuard<'a> {
    store: &'a Store<StepperState>,
}

impl<'a> ValidationGuard<'a> {
    fn start(store: &'a Store<StepperState>) -> Self {
        set_validating(store, true);
        Self { store }
    }
}

impl Drop for ValidationGuard<'_> {
    fn drop(&mut self) {
        if self.store.with_state(|s| s.validating) {
            set_validating(self.store, false);
        }
    }
}

fn set_validating(store: &Store<StepperState>, validating: bool) {
    store.update_state(move |s| {
        let mut next = s.clone();
        next.validating = validating;
        next
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use husk_core::testing::TestHarness;
    use husk_core::AttrValue;

    fn steps() -> Vec<Step> {
        vec![
            Step::new("Account"),
            Step::new("Profile").optional(),
            Step::new("Review").description("Check everything"),
        ]
    }

    fn stepper(linear: bool) -> TestHarness<StepperState> {
        TestHarness::new(create_stepper().create(&StepperOptions {
            steps: steps(),
            linear,
            ..Default::default()
        }))
    }

    #[test]
    fn test_next_marks_completed_and_advances() {
        let h = stepper(false);
        h.dispatch(events::NEXT);
        let s = h.state();
        assert_eq!(s.current, 1);
        assert!(s.is_completed(0));
    }

    #[test]
    fn test_next_on_last_step_completes_it_once() {
        let h = stepper(false);
        go_to_step(h.core(), 2);
        h.dispatch(events::NEXT);
        h.dispatch(events::NEXT);
        assert_eq!(h.state().current, 2);
        assert!(h.state().is_completed(2));
        // jump + one completion
        assert_eq!(h.render_count(), 2);
    }

    #[test]
    fn test_previous_stops_at_first() {
        let h = stepper(false);
        h.dispatch(events::PREVIOUS);
        assert_eq!(h.state().current, 0);
        assert_eq!(h.render_count(), 0);
        assert_eq!(h.attr("previous", "aria-disabled"), Some(AttrValue::Bool(true)));
    }

    #[test]
    fn test_linear_blocks_jump_past_first_incomplete() {
        let h = stepper(true);
        go_to_step(h.core(), 2);
        assert_eq!(h.state().current, 0);
        assert_eq!(h.attr("step-2", "aria-disabled"), Some(AttrValue::Bool(true)));

        h.dispatch(events::COMPLETE);
        // Step 1 is optional, so completing step 0 unlocks step 2.
        go_to_step(h.core(), 2);
        assert_eq!(h.state().current, 2);
    }

    #[test]
    fn test_non_linear_allows_any_jump() {
        let h = stepper(false);
        assert!(h.fire("steps", InputEvent::Select(2)));
        assert_eq!(h.state().current, 2);
        go_to_step(h.core(), 9);
        assert_eq!(h.state().current, 2);
    }

    #[test]
    fn test_linear_allows_going_back() {
        let h = stepper(true);
        h.dispatch(events::NEXT);
        h.dispatch(events::NEXT);
        assert_eq!(h.state().current, 2);
        go_to_step(h.core(), 0);
        assert_eq!(h.state().current, 0);
    }

    #[test]
    fn test_arrow_keys_navigate() {
        let h = stepper(false);
        h.fire("steps", InputEvent::key(Key::Right));
        h.fire("steps", InputEvent::key(Key::Right));
        h.fire("steps", InputEvent::key(Key::Left));
        assert_eq!(h.state().current, 1);
    }

    #[test]
    fn test_step_props_track_current() {
        let h = stepper(false);
        assert_eq!(
            h.attr("step-0", "aria-current"),
            Some(AttrValue::Text("step".into()))
        );
        h.dispatch(events::NEXT);
        assert_eq!(h.attr("step-0", "aria-current"), None);
        assert_eq!(
            h.attr("step-0", "data-state"),
            Some(AttrValue::Text("completed".into()))
        );
        assert_eq!(
            h.attr("step-1", "aria-label"),
            Some(AttrValue::Text("Step 2: Profile".into()))
        );
    }

    #[test]
    fn test_reset_clears_progress() {
        let h = stepper(false);
        h.dispatch(events::NEXT);
        h.dispatch(events::NEXT);
        h.dispatch(events::RESET);
        let s = h.state();
        assert_eq!(s.current, 0);
        assert!(s.completed.is_empty());
    }

    #[test]
    fn test_finished_ignores_optional_steps() {
        let h = stepper(false);
        h.dispatch(events::COMPLETE);
        go_to_step(h.core(), 2);
        h.dispatch(events::COMPLETE);
        assert!(h.state().is_finished());
    }

    #[test]
    fn test_empty_stepper_is_inert() {
        let h = TestHarness::new(create_stepper().create_default());
        h.dispatch(events::NEXT);
        assert_eq!(h.state().current, 0);
        assert_eq!(h.render_count(), 0);
    }

    #[test]
    fn test_next_async_advances_when_valid() {
        let h = stepper(false);
        let advanced =
            futures::executor::block_on(next_async(h.core(), |_| async { true })).unwrap();
        assert!(advanced);
        assert_eq!(h.state().current, 1);
        assert!(!h.state().validating);
    }

    #[test]
    fn test_next_async_rejection_stays() {
        let h = stepper(false);
        let advanced = futures::executor::block_on(next_async(h.core(), |s| async move {
            s.current != 0
        }))
        .unwrap();
        assert!(!advanced);
        assert_eq!(h.state().current, 0);
        assert!(!h.state().validating);
    }

    #[test]
    fn test_next_async_rejects_concurrent_call() {
        let h = stepper(false);
        let core = h.core().clone();
        let (release, gate) = futures::channel::oneshot::channel::<()>();

        let first = next_async(&core, |_| async move { gate.await.is_ok() });
        let second = async {
            // Runs after `first` has parked on the gate.
            let busy = h.attr("next", "aria-busy");
            let result = next_async(&core, |_| async { true }).await;
            let _ = release.send(());
            (busy, result)
        };

        let (first, (busy, second)) = futures::executor::block_on(async {
            futures::join!(first, second)
        });
        assert_eq!(busy, Some(AttrValue::Bool(true)));
        assert!(matches!(second, Err(StepperError::ValidationInFlight)));
        assert!(first.unwrap());
        assert_eq!(h.state().current, 1);
    }

    #[tokio::test]
    async fn test_next_async_with_yielding_validator() {
        let h = stepper(true);
        let advanced = next_async(h.core(), |_| async {
            tokio::task::yield_now().await;
            true
        })
        .await
        .unwrap();
        assert!(advanced);
        assert_eq!(h.state().current, 1);
    }

    #[test]
    fn test_next_async_after_destroy_errors() {
        let h = stepper(false);
        h.core().destroy();
        let result = futures::executor::block_on(next_async(h.core(), |_| async { true }));
        assert!(matches!(result, Err(StepperError::Core(CoreError::Destroyed { .. }))));
    }

    #[test]
    fn test_dropped_next_async_clears_validating() {
        use futures::FutureExt;

        let h = stepper(false);
        let pending = next_async(h.core(), |_| futures::future::pending::<bool>());
        assert!(pending.now_or_never().is_none());
        assert!(!h.state().validating);
        assert_eq!(h.attr("next", "aria-busy"), None);

        assert!(h.fire("next", InputEvent::Click));
        assert_eq!(h.state().current, 1);
        let advanced =
            futures::executor::block_on(next_async(h.core(), |_| async { true })).unwrap();
        assert!(advanced);
        assert_eq!(h.state().current, 2);
    }

    #[test]
    fn test_next_async_skips_advance_when_step_moved() {
        let h = stepper(false);
        let core = h.core().clone();
        let (release, gate) = futures::channel::oneshot::channel::<()>();

        let validation = next_async(&core, |_| async move { gate.await.is_ok() });
        let jump = async {
            go_to_step(&core, 2);
            let _ = release.send(());
        };

        let (advanced, ()) = futures::executor::block_on(async { futures::join!(validation, jump) });
        assert!(!advanced.unwrap());
        assert_eq!(h.state().current, 2);
        assert!(!h.state().validating);
    }
}
