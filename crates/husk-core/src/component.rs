//! Binding a store, a logic layer and metadata into one connectable unit.
//!
//! A widget module describes itself once with a [`ComponentConfig`] (or the
//! fluent [`ComponentBuilder`]) and gets back a [`ComponentFactory`].  Every
//! call to [`ComponentFactory::create`] produces a fresh, fully wired
//! [`ComponentCore`]:
//!
//! ```text
//! create(options)
//!   ├─ store = Store::new(create_initial_state(options))
//!   ├─ logic = create_logic(store, options)
//!   ├─ logic.connect(store); logic.initialize()
//!   └─ ComponentCore { store, logic, metadata }
//! ```
//!
//! Rendering frameworks only ever meet the core through
//! [`ComponentCore::connect`].

use crate::a11y::A11yProps;
use crate::adapter::Adapter;
use crate::error::CoreError;
use crate::event::InputEvent;
use crate::logic::{LogicLayer, Merge};
use crate::metadata::ComponentMetadata;
use crate::store::Store;
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

/// `options -> initial state`.
pub type StateConstructor<S, O> = Rc<dyn Fn(&O) -> S>;

/// `(store, options) -> logic layer`.  The returned layer may or may not be
/// connected yet; the factory connects and initializes it.
pub type LogicConstructor<S, E, O> = Rc<dyn Fn(&Store<S>, &O) -> LogicLayer<S, E>>;

pub type DestroyHook = Rc<dyn Fn()>;

/// Everything a [`ComponentFactory`] needs to build cores.
///
/// `O` is the options type accepted by [`ComponentFactory::create`]; widgets
/// without options use `()`.
pub struct ComponentConfig<S: Merge + 'static, E: 'static = InputEvent, O: 'static = ()> {
    pub name: String,
    /// Overrides `metadata.version` when set.
    pub version: Option<String>,
    pub create_initial_state: StateConstructor<S, O>,
    pub create_logic: LogicConstructor<S, E, O>,
    pub metadata: ComponentMetadata,
    /// Runs last, once, from [`ComponentCore::destroy`].
    pub on_destroy: Option<DestroyHook>,
}

impl<S, E, O> ComponentConfig<S, E, O>
where
    S: Merge + Clone + 'static,
    E: 'static,
    O: 'static,
{
    /// A configuration with the required fields and no version override or
    /// destroy hook.
    pub fn new(
        name: impl Into<String>,
        create_initial_state: impl Fn(&O) -> S + 'static,
        create_logic: impl Fn(&Store<S>, &O) -> LogicLayer<S, E> + 'static,
        metadata: ComponentMetadata,
    ) -> Self {
        Self {
            name: name.into(),
            version: None,
            create_initial_state: Rc::new(create_initial_state),
            create_logic: Rc::new(create_logic),
            metadata,
            on_destroy: None,
        }
    }
}

/// Produces independent [`ComponentCore`] instances from one configuration.
///
/// Cloning a factory is cheap; clones share the configuration.
pub struct ComponentFactory<S: Merge + 'static, E: 'static = InputEvent, O: 'static = ()> {
    config: Rc<ComponentConfig<S, E, O>>,
}

impl<S: Merge + 'static, E: 'static, O: 'static> Clone for ComponentFactory<S, E, O> {
    fn clone(&self) -> Self {
        Self {
            config: Rc::clone(&self.config),
        }
    }
}

impl<S, E, O> ComponentFactory<S, E, O>
where
    S: Merge + Clone + 'static,
    E: 'static,
    O: 'static,
{
    pub fn new(config: ComponentConfig<S, E, O>) -> Self {
        Self {
            config: Rc::new(config),
        }
    }

    /// Start a fluent [`ComponentBuilder`].
    pub fn builder() -> ComponentBuilder<S, E, O> {
        ComponentBuilder::new()
    }

    /// Build a fresh core: new store, new logic layer, connected and
    /// initialized.
    pub fn create(&self, options: &O) -> ComponentCore<S, E> {
        let config = &self.config;
        let store = Store::new((config.create_initial_state)(options));
        let logic = (config.create_logic)(&store, options);
        logic.connect(&store);
        logic.initialize();

        let version = config
            .version
            .clone()
            .unwrap_or_else(|| config.metadata.version.clone());
        tracing::debug!(component = %config.name, %version, "component created");

        ComponentCore {
            inner: Rc::new(CoreInner {
                name: config.name.clone(),
                version,
                store,
                logic,
                metadata: config.metadata.clone(),
                on_destroy: config.on_destroy.clone(),
                cleanups: RefCell::new(Vec::new()),
                destroyed: Cell::new(false),
            }),
        }
    }

    /// Build a core with default options.
    pub fn create_default(&self) -> ComponentCore<S, E>
    where
        O: Default,
    {
        self.create(&O::default())
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn metadata(&self) -> &ComponentMetadata {
        &self.config.metadata
    }
}

impl<S: Merge + 'static, E: 'static, O: 'static> fmt::Debug for ComponentFactory<S, E, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentFactory")
            .field("name", &self.config.name)
            .finish_non_exhaustive()
    }
}

/// Wrap a configuration in a factory.
pub fn create_component_factory<S, E, O>(config: ComponentConfig<S, E, O>) -> ComponentFactory<S, E, O>
where
    S: Merge + Clone + 'static,
    E: 'static,
    O: 'static,
{
    ComponentFactory::new(config)
}

/// Fluent, validated alternative to filling in a [`ComponentConfig`].
///
/// [`build`](ComponentBuilder::build) fails with
/// [`CoreError::MissingField`] if the name, either constructor or the
/// metadata was never supplied.
pub struct ComponentBuilder<S: Merge + 'static, E: 'static = InputEvent, O: 'static = ()> {
    name: Option<String>,
    version: Option<String>,
    create_initial_state: Option<StateConstructor<S, O>>,
    create_logic: Option<LogicConstructor<S, E, O>>,
    metadata: Option<ComponentMetadata>,
    on_destroy: Option<DestroyHook>,
}

impl<S, E, O> Default for ComponentBuilder<S, E, O>
where
    S: Merge + Clone + 'static,
    E: 'static,
    O: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, E, O> ComponentBuilder<S, E, O>
where
    S: Merge + Clone + 'static,
    E: 'static,
    O: 'static,
{
    pub fn new() -> Self {
        Self {
            name: None,
            version: None,
            create_initial_state: None,
            create_logic: None,
            metadata: None,
            on_destroy: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn initial_state(mut self, f: impl Fn(&O) -> S + 'static) -> Self {
        self.create_initial_state = Some(Rc::new(f));
        self
    }

    pub fn logic(mut self, f: impl Fn(&Store<S>, &O) -> LogicLayer<S, E> + 'static) -> Self {
        self.create_logic = Some(Rc::new(f));
        self
    }

    pub fn metadata(mut self, metadata: ComponentMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn on_destroy(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_destroy = Some(Rc::new(hook));
        self
    }

    pub fn build(self) -> Result<ComponentFactory<S, E, O>, CoreError> {
        let name = self.name.ok_or(CoreError::MissingField { field: "name" })?;
        let create_initial_state = self.create_initial_state.ok_or(CoreError::MissingField {
            field: "create_initial_state",
        })?;
        let create_logic = self.create_logic.ok_or(CoreError::MissingField {
            field: "create_logic",
        })?;
        let metadata = self
            .metadata
            .ok_or(CoreError::MissingField { field: "metadata" })?;

        Ok(ComponentFactory::new(ComponentConfig {
            name,
            version: self.version,
            create_initial_state,
            create_logic,
            metadata,
            on_destroy: self.on_destroy,
        }))
    }
}

struct CoreInner<S: Merge + 'static, E: 'static> {
    name: String,
    version: String,
    store: Store<S>,
    logic: LogicLayer<S, E>,
    metadata: ComponentMetadata,
    on_destroy: Option<DestroyHook>,
    cleanups: RefCell<Vec<Box<dyn FnOnce()>>>,
    destroyed: Cell<bool>,
}

/// One live widget instance.
///
/// A core may be connected to any number of adapters at once; each produced
/// component shares the same store, so a state change is seen by all of them.
/// Clones are handles to the same instance.
pub struct ComponentCore<S: Merge + 'static, E: 'static = InputEvent> {
    inner: Rc<CoreInner<S, E>>,
}

impl<S: Merge + 'static, E: 'static> Clone for ComponentCore<S, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S, E> ComponentCore<S, E>
where
    S: Merge + Clone + 'static,
    E: 'static,
{
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn version(&self) -> &str {
        &self.inner.version
    }

    /// The store holding this instance's state.
    pub fn state(&self) -> &Store<S> {
        &self.inner.store
    }

    pub fn logic(&self) -> &LogicLayer<S, E> {
        &self.inner.logic
    }

    pub fn metadata(&self) -> &ComponentMetadata {
        &self.inner.metadata
    }

    /// Hand this core to `adapter` and return what it produces.
    ///
    /// Runs [`Adapter::create_component`] and then [`Adapter::optimize`].
    /// Either failure is wrapped in [`CoreError::Adapter`].  On success one
    /// cleanup entry is registered, running the adapter's
    /// [`teardown`](Adapter::teardown) hook for that component (if any) on
    /// [`destroy`](Self::destroy).
    ///
    /// # Errors
    ///
    /// [`CoreError::Destroyed`] once the core has been destroyed.
    pub fn connect<A>(&self, adapter: &A) -> Result<A::Output, CoreError>
    where
        A: Adapter<S, E> + ?Sized,
    {
        self.ensure_alive()?;

        let wrap = |source| CoreError::Adapter {
            component: self.inner.name.clone(),
            adapter: adapter.name().to_owned(),
            source,
        };
        let component = adapter.create_component(self).map_err(wrap)?;
        let component = adapter.optimize(component).map_err(wrap)?;

        let teardown = adapter.teardown(&component);
        self.inner.cleanups.borrow_mut().push(Box::new(move || {
            if let Some(teardown) = teardown {
                teardown();
            }
        }));
        tracing::debug!(
            component = %self.inner.name,
            adapter = adapter.name(),
            "component connected"
        );
        Ok(component)
    }

    /// Tear the instance down.
    ///
    /// Cleans up the logic layer, runs every per-connection cleanup in
    /// connection order, then the `on_destroy` hook.  Calling it again is a
    /// no-op.
    pub fn destroy(&self) {
        if self.inner.destroyed.replace(true) {
            tracing::debug!(component = %self.inner.name, "destroy called twice, ignoring");
            return;
        }
        self.inner.logic.cleanup();

        let cleanups = std::mem::take(&mut *self.inner.cleanups.borrow_mut());
        for cleanup in cleanups {
            cleanup();
        }
        if let Some(hook) = &self.inner.on_destroy {
            hook();
        }
        tracing::debug!(component = %self.inner.name, "component destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }

    /// `Err(CoreError::Destroyed)` once [`destroy`](Self::destroy) has run.
    pub fn ensure_alive(&self) -> Result<(), CoreError> {
        if self.is_destroyed() {
            return Err(CoreError::Destroyed {
                component: self.inner.name.clone(),
            });
        }
        Ok(())
    }

    /// Successful connections not yet torn down by `destroy`.
    pub fn connection_count(&self) -> usize {
        self.inner.cleanups.borrow().len()
    }

    /// Every known element with its current attributes.
    ///
    /// Covers the elements declared in `metadata.structure` and any element
    /// the logic layer generates props or handlers for, in id order.  The
    /// role is the generated `role` attribute when present, otherwise the
    /// declared one; the root element falls back to the component role.
    pub fn snapshot(&self) -> Vec<ElementSnapshot> {
        let metadata = &self.inner.metadata;
        let root = metadata.root_element().map(|(id, _)| id.to_owned());

        let ids: BTreeSet<String> = metadata
            .structure
            .elements
            .keys()
            .cloned()
            .chain(self.inner.logic.element_ids())
            .collect();

        ids.into_iter()
            .map(|id| {
                let spec = metadata.structure.elements.get(&id);
                let props = self.inner.logic.get_a11y_props(&id);
                let role = props
                    .get("role")
                    .map(ToString::to_string)
                    .or_else(|| spec.and_then(|s| s.role.clone()))
                    .or_else(|| {
                        if root.as_deref() == Some(id.as_str()) {
                            metadata.accessibility.role.clone()
                        } else {
                            None
                        }
                    });
                ElementSnapshot {
                    element_type: spec.map(|s| s.element_type.clone()),
                    optional: spec.is_some_and(|s| s.optional),
                    role,
                    props,
                    id,
                }
            })
            .collect()
    }
}

impl<S: Merge + 'static, E: 'static> fmt::Debug for ComponentCore<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentCore")
            .field("name", &self.inner.name)
            .field("version", &self.inner.version)
            .field("destroyed", &self.inner.destroyed.get())
            .field("connections", &self.inner.cleanups.borrow().len())
            .finish_non_exhaustive()
    }
}

/// One element of a [`ComponentCore::snapshot`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSnapshot {
    pub id: String,
    /// Declared element type; `None` for elements only the logic layer knows.
    pub element_type: Option<String>,
    pub role: Option<String>,
    pub optional: bool,
    pub props: A11yProps,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::metadata::ElementSpec;
    use std::error::Error as _;

    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        value: i32,
    }

    struct CounterPatch {
        value: Option<i32>,
    }

    impl Merge for Counter {
        type Patch = CounterPatch;

        fn merge(&mut self, patch: CounterPatch) {
            if let Some(value) = patch.value {
                self.value = value;
            }
        }
    }

    fn counter_logic(_: &Store<Counter>, _: &i32) -> LogicLayer<Counter> {
        LogicLayer::<Counter, InputEvent>::builder()
            .on_event("increment", |s, _| {
                Some(CounterPatch {
                    value: Some(s.value + 1),
                })
            })
            .with_a11y("display", |s| {
                A11yProps::new().with("aria-label", format!("Count {}", s.value))
            })
            .build()
    }

    fn widget_meta() -> ComponentMetadata {
        ComponentMetadata::new("Widget")
            .version("1.2.0")
            .role("group")
            .element("root", ElementSpec::new("div"))
            .element("display", ElementSpec::new("span").role("status"))
    }

    fn factory() -> ComponentFactory<Counter, InputEvent, i32> {
        ComponentFactory::new(ComponentConfig::new(
            "Widget",
            |start: &i32| Counter { value: *start },
            counter_logic,
            widget_meta(),
        ))
    }

    struct Rendered;

    impl Adapter<Counter> for Rendered {
        type Output = String;

        fn name(&self) -> &str {
            "stub"
        }

        fn create_component(&self, core: &ComponentCore<Counter>) -> Result<String, BoxError> {
            Ok(format!("rendered:{}", core.metadata().name))
        }

        fn optimize(&self, component: String) -> Result<String, BoxError> {
            Ok(component + "!")
        }
    }

    struct Broken;

    impl Adapter<Counter> for Broken {
        type Output = ();

        fn name(&self) -> &str {
            "broken"
        }

        fn create_component(&self, _: &ComponentCore<Counter>) -> Result<(), BoxError> {
            Err("no host element".into())
        }
    }

    struct Counting(Rc<Cell<u32>>);

    impl Adapter<Counter> for Counting {
        type Output = ();

        fn name(&self) -> &str {
            "counting"
        }

        fn create_component(&self, _: &ComponentCore<Counter>) -> Result<(), BoxError> {
            Ok(())
        }

        fn teardown(&self, _: &()) -> Option<Box<dyn FnOnce()>> {
            let count = self.0.clone();
            Some(Box::new(move || count.set(count.get() + 1)))
        }
    }

    #[test]
    fn create_builds_connected_initialized_core() {
        let core = factory().create(&5);
        assert_eq!(core.state().get_state(), Counter { value: 5 });
        assert!(core.logic().is_connected());
        assert!(core.logic().is_initialized());
        assert!(core.logic().store().is_some_and(|s| s.ptr_eq(core.state())));
    }

    #[test]
    fn each_create_is_independent() {
        let f = factory();
        let a = f.create(&0);
        let b = f.create(&0);
        a.logic().dispatch("increment");
        assert_eq!(a.state().get_state().value, 1);
        assert_eq!(b.state().get_state().value, 0);
    }

    #[test]
    fn round_trip_increment() {
        let core = factory().create(&0);
        for _ in 0..3 {
            core.logic().handle_event("increment", None);
        }
        assert_eq!(core.state().get_state().value, 3);
    }

    #[test]
    fn version_defaults_to_metadata_and_can_be_overridden() {
        assert_eq!(factory().create(&0).version(), "1.2.0");

        let mut config = ComponentConfig::new(
            "Widget",
            |start: &i32| Counter { value: *start },
            counter_logic,
            widget_meta(),
        );
        config.version = Some("9.0.0".into());
        assert_eq!(ComponentFactory::new(config).create(&0).version(), "9.0.0");
    }

    #[test]
    fn connect_runs_create_then_optimize() {
        let core = factory().create(&0);
        assert_eq!(core.connect(&Rendered).unwrap(), "rendered:Widget!");
        assert_eq!(core.connection_count(), 1);
    }

    #[test]
    fn connect_many_adapters() {
        let core = factory().create(&0);
        core.connect(&Rendered).unwrap();
        core.connect(&Rendered).unwrap();
        assert_eq!(core.connection_count(), 2);
    }

    #[test]
    fn adapter_failure_is_wrapped_with_context() {
        let core = factory().create(&0);
        let err = core.connect(&Broken).unwrap_err();
        match &err {
            CoreError::Adapter {
                component, adapter, ..
            } => {
                assert_eq!(component, "Widget");
                assert_eq!(adapter, "broken");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.source().unwrap().to_string(), "no host element");
        assert_eq!(core.connection_count(), 0);
    }

    #[test]
    fn destroy_twice_runs_hook_once() {
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        let mut config = ComponentConfig::new(
            "Widget",
            |start: &i32| Counter { value: *start },
            counter_logic,
            widget_meta(),
        );
        config.on_destroy = Some(Rc::new(move || seen.set(seen.get() + 1)));
        let core = ComponentFactory::new(config).create(&0);

        core.destroy();
        core.destroy();
        assert_eq!(calls.get(), 1);
        assert!(core.is_destroyed());
    }

    #[test]
    fn destroy_without_connect_is_fine() {
        let core = factory().create(&0);
        core.destroy();
        assert!(!core.logic().is_connected());
    }

    #[test]
    fn destroy_runs_teardown_per_connection() {
        let torn_down = Rc::new(Cell::new(0));
        let core = factory().create(&0);
        core.connect(&Counting(torn_down.clone())).unwrap();
        core.connect(&Counting(torn_down.clone())).unwrap();

        core.destroy();
        assert_eq!(torn_down.get(), 2);
        assert_eq!(core.connection_count(), 0);

        core.destroy();
        assert_eq!(torn_down.get(), 2);
    }

    #[test]
    fn connect_after_destroy_fails_loudly() {
        let core = factory().create(&0);
        core.destroy();
        assert!(matches!(
            core.connect(&Rendered),
            Err(CoreError::Destroyed { component }) if component == "Widget"
        ));
    }

    #[test]
    fn logic_is_inert_after_destroy() {
        let core = factory().create(&0);
        core.destroy();
        core.logic().dispatch("increment");
        assert_eq!(core.state().get_state().value, 0);
        assert!(core.logic().get_a11y_props("display").is_empty());
    }

    #[test]
    fn builder_reports_first_missing_field() {
        let missing = |b: ComponentBuilder<Counter, InputEvent, i32>| match b.build() {
            Err(CoreError::MissingField { field }) => field,
            other => panic!("expected missing field, got {other:?}"),
        };

        assert_eq!(missing(ComponentBuilder::new()), "name");
        assert_eq!(
            missing(ComponentBuilder::new().name("Widget")),
            "create_initial_state"
        );
        assert_eq!(
            missing(
                ComponentBuilder::new()
                    .name("Widget")
                    .initial_state(|v: &i32| Counter { value: *v })
            ),
            "create_logic"
        );
        assert_eq!(
            missing(
                ComponentBuilder::new()
                    .name("Widget")
                    .initial_state(|v: &i32| Counter { value: *v })
                    .logic(counter_logic)
            ),
            "metadata"
        );
    }

    #[test]
    fn builder_produces_working_factory() {
        let destroyed = Rc::new(Cell::new(false));
        let flag = destroyed.clone();
        let factory = ComponentFactory::<Counter, InputEvent, i32>::builder()
            .name("Widget")
            .version("3.0.0")
            .initial_state(|v: &i32| Counter { value: *v })
            .logic(counter_logic)
            .metadata(widget_meta())
            .on_destroy(move || flag.set(true))
            .build()
            .unwrap();

        assert_eq!(factory.name(), "Widget");
        let core = factory.create(&2);
        assert_eq!(core.version(), "3.0.0");
        core.logic().dispatch("increment");
        assert_eq!(core.state().get_state().value, 3);
        core.destroy();
        assert!(destroyed.get());
    }

    #[test]
    fn create_default_uses_default_options() {
        let core = factory().create_default();
        assert_eq!(core.state().get_state().value, 0);
    }

    #[test]
    fn snapshot_merges_declared_and_generated_elements() {
        let core = factory().create(&4);
        let snapshot = core.snapshot();
        let ids: Vec<&str> = snapshot.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["display", "root"]);

        let display = &snapshot[0];
        assert_eq!(display.element_type.as_deref(), Some("span"));
        assert_eq!(display.role.as_deref(), Some("status"));
        assert_eq!(
            display.props.get("aria-label").and_then(|v| v.as_str()),
            Some("Count 4")
        );

        let root = &snapshot[1];
        assert_eq!(root.role.as_deref(), Some("group"));
        assert!(root.props.is_empty());
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let core = factory().create(&1);
        let json = serde_json::to_value(core.snapshot()).unwrap();
        assert_eq!(json[0]["id"], "display");
        assert_eq!(json[0]["elementType"], "span");
        assert_eq!(json[0]["props"]["aria-label"], "Count 1");
    }
}
