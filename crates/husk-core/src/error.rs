/// Error type for adapter-originated failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the component layer.
///
/// Lifecycle misuse that the core can recover from (dispatching to a
/// disconnected logic layer, unknown element ids) is logged instead and never
/// shows up here.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A [`ComponentBuilder`](crate::component::ComponentBuilder) was built
    /// without one of its required fields.
    #[error("component configuration is missing required field `{field}`")]
    MissingField { field: &'static str },

    /// An adapter failed while creating or optimizing its component.
    #[error("adapter `{adapter}` failed to render component `{component}`: {source}")]
    Adapter {
        component: String,
        adapter: String,
        #[source]
        source: BoxError,
    },

    /// The component was used after [`destroy`](crate::component::ComponentCore::destroy).
    #[error("component `{component}` was used after being destroyed")]
    Destroyed { component: String },
}
