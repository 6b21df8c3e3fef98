//! In-process action pipeline.

use std::sync::Arc;

use access_control_sdk::{
    Action, Chain, ConfigurationError, Handler, InterceptError, Interceptor, InterceptorFactory,
};
use access_security::Caller;

/// A registered action: its handler wrapped by the interceptors that the
/// factories produced for it, in factory order.
///
/// Built once at registration time; invoking it is `&self` and safe from
/// many threads at once.
pub struct ActionPipeline<A, R> {
    action: Action,
    stages: Vec<Arc<dyn Interceptor<A, R>>>,
    handler: Arc<Handler<A, R>>,
}

impl<A, R> ActionPipeline<A, R> {
    /// Ask every factory for a stage and bind them to `handler`.
    ///
    /// # Errors
    ///
    /// Fails with the first factory's `ConfigurationError`.
    pub fn new<F>(
        action: Action,
        handler: F,
        factories: &[Arc<dyn InterceptorFactory<A, R>>],
    ) -> Result<Self, ConfigurationError>
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        let mut stages = Vec::with_capacity(factories.len());
        for factory in factories {
            if let Some(stage) = factory.create(&action)? {
                stages.push(stage);
            }
        }

        Ok(Self {
            action,
            stages,
            handler: Arc::new(handler),
        })
    }

    #[must_use]
    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Number of interceptors in front of the handler.
    #[must_use]
    pub fn interceptor_count(&self) -> usize {
        self.stages.len()
    }

    /// Run one request through the pipeline.
    ///
    /// # Errors
    ///
    /// Returns the error of the first interceptor that rejects the request.
    pub fn invoke(&self, caller: Option<&Caller>, args: A) -> Result<R, InterceptError> {
        Chain::new(&self.action, caller, args, &self.stages, self.handler.as_ref()).proceed()
    }
}

impl<A, R> std::fmt::Debug for ActionPipeline<A, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionPipeline")
            .field("action", &self.action)
            .field("interceptors", &self.stages.len())
            .finish_non_exhaustive()
    }
}
