//! The contract every rendering integration implements.
//!
//! An adapter turns a [`ComponentCore`] into whatever its host framework
//! renders: a retained widget tree, a terminal view, a serialized document.
//! The core calls it from [`ComponentCore::connect`] and never looks inside the
//! result.
//!
//! An adapter's produced component is expected to:
//!
//! 1. read [`ComponentCore::metadata`] to decide the root element type and
//!    fall back to the declared role when the logic layer supplies none;
//! 2. apply [`get_a11y_props`](crate::logic::LogicLayer::get_a11y_props) to
//!    each element it draws, re-reading them after every state change;
//! 3. route raw input through
//!    [`get_interaction_handlers`](crate::logic::LogicLayer::get_interaction_handlers);
//! 4. [`subscribe`](crate::store::Store::subscribe) to the store and redraw on
//!    every notification;
//! 5. call [`ComponentCore::destroy`] exactly once when it is permanently
//!    removed, never on an ordinary redraw;
//! 6. push externally controlled values into the store through the widget's
//!    own setters rather than through private event handlers.

use crate::component::ComponentCore;
use crate::error::BoxError;
use crate::event::InputEvent;
use crate::logic::Merge;

/// Binds a [`ComponentCore`] to one host framework.
///
/// Only [`create_component`](Adapter::create_component) is required.  Errors
/// returned from it or from [`optimize`](Adapter::optimize) reach the caller of
/// `connect` wrapped in [`CoreError::Adapter`](crate::error::CoreError::Adapter)
/// with the component and adapter names attached.
///
/// # Example
///
/// ```
/// use husk_core::{Adapter, BoxError, ComponentCore, Merge};
///
/// struct Describe;
///
/// impl<S: Merge + Clone + 'static> Adapter<S> for Describe {
///     type Output = String;
///
///     fn name(&self) -> &str { "describe" }
///
///     fn create_component(&self, core: &ComponentCore<S>) -> Result<String, BoxError> {
///         Ok(format!("<{}>", core.metadata().name))
///     }
/// }
/// ```
pub trait Adapter<S, E = InputEvent>
where
    S: Merge + Clone + 'static,
    E: 'static,
{
    /// The framework-native value `connect` hands back.
    type Output;

    /// Short identifier used in error messages and logs.
    fn name(&self) -> &str;

    fn version(&self) -> &str {
        "0.0.0"
    }

    /// Produce a renderable unit for `core`.
    fn create_component(&self, core: &ComponentCore<S, E>) -> Result<Self::Output, BoxError>;

    /// Post-process the produced component.  The default passes it through.
    fn optimize(&self, component: Self::Output) -> Result<Self::Output, BoxError> {
        Ok(component)
    }

    /// Adapter-side teardown to run when the core is destroyed.
    ///
    /// Called once per successful `connect` with the component about to be
    /// returned; the closure is registered with the core and invoked from
    /// [`ComponentCore::destroy`].  Components that subscribe to the store
    /// hand their unsubscribe here so no listener outlives the core.
    fn teardown(&self, _component: &Self::Output) -> Option<Box<dyn FnOnce()>> {
        None
    }
}
