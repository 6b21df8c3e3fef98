//! Access control module entry point.

use std::sync::Arc;

use access_control_sdk::{
    Action, ConfigurationError, InterceptorFactory, ResolvedPolicy,
};
use tracing::info;

use crate::api::rest::AccessRouter;
use crate::config::{AccessControlConfig, ConfigError};
use crate::domain::{AccessAnnotationRegistry, AccessInterceptorFactory, PolicyResolver};
use crate::pipeline::ActionPipeline;

/// Access control module.
///
/// Owns the access annotation registry built at startup and hands out
/// interceptors, pipelines and routers bound to it.
#[derive(Debug, Clone)]
pub struct AccessControl {
    factory: AccessInterceptorFactory,
    deny_unregistered_routes: bool,
}

impl AccessControl {
    /// Build the module from its configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Registry` if the configured entries are invalid.
    pub fn from_config(cfg: &AccessControlConfig) -> Result<Self, ConfigError> {
        info!("Initializing access_control");

        let registry = cfg.build_registry()?;
        info!(
            entries = registry.len(),
            deny_unregistered_routes = cfg.deny_unregistered_routes,
            "Loaded access annotation entries"
        );

        Ok(Self::new(registry, cfg.deny_unregistered_routes))
    }

    /// Build the module around an already populated registry.
    #[must_use]
    pub fn new(registry: AccessAnnotationRegistry, deny_unregistered_routes: bool) -> Self {
        Self {
            factory: AccessInterceptorFactory::new(Arc::new(registry)),
            deny_unregistered_routes,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &AccessAnnotationRegistry {
        self.factory.registry()
    }

    #[must_use]
    pub fn factory(&self) -> &AccessInterceptorFactory {
        &self.factory
    }

    /// Resolve an action's policy without building an interceptor.
    ///
    /// # Errors
    ///
    /// See [`PolicyResolver::resolve`].
    pub fn resolve(&self, action: &Action) -> Result<ResolvedPolicy, ConfigurationError> {
        PolicyResolver::new(self.registry()).resolve(action)
    }

    /// Bind `handler` to `action` behind the access interceptor.
    ///
    /// # Errors
    ///
    /// Returns the action's `ConfigurationError`, if any.
    pub fn pipeline<A, R, F>(
        &self,
        action: Action,
        handler: F,
    ) -> Result<ActionPipeline<A, R>, ConfigurationError>
    where
        A: 'static,
        R: 'static,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        let factory: Arc<dyn InterceptorFactory<A, R>> = Arc::new(self.factory.clone());
        ActionPipeline::new(action, handler, &[factory])
    }

    /// Start a router whose routes are checked by this module.
    #[must_use]
    pub fn router<S>(&self) -> AccessRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        AccessRouter::new(self.factory.clone(), self.deny_unregistered_routes)
    }
}
