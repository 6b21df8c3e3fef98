//! Binds resolved policies to access interceptors at registration time.

use std::sync::Arc;

use access_control_sdk::{
    Action, ConfigurationError, Interceptor, InterceptorFactory, ResolvedPolicy,
};
use tracing::{debug, error};

use super::interceptor::AccessInterceptor;
use super::registry::AccessAnnotationRegistry;
use super::resolver::PolicyResolver;

/// Creates the [`AccessInterceptor`] of each registered action.
#[derive(Debug, Clone)]
pub struct AccessInterceptorFactory {
    registry: Arc<AccessAnnotationRegistry>,
}

impl AccessInterceptorFactory {
    #[must_use]
    pub fn new(registry: Arc<AccessAnnotationRegistry>) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &AccessAnnotationRegistry {
        &self.registry
    }

    /// Resolve `action` and build its interceptor.
    ///
    /// `Ok(None)` for public actions: nothing to check.
    ///
    /// # Errors
    ///
    /// Propagates the resolver's `ConfigurationError`; the action must not be
    /// registered.
    pub fn create_access_interceptor(
        &self,
        action: &Action,
    ) -> Result<Option<Arc<AccessInterceptor>>, ConfigurationError> {
        let policy = PolicyResolver::new(&self.registry)
            .resolve(action)
            .inspect_err(|err| error!(action = action.name(), "Invalid access annotations: {err}"))?;

        match policy {
            ResolvedPolicy::Bypass => {
                debug!(action = action.name(), "Action is public, no access interceptor");
                Ok(None)
            }
            ResolvedPolicy::Check(policy) => Ok(Some(Arc::new(AccessInterceptor::new(
                action.name(),
                policy,
            )))),
        }
    }
}

impl<A, R> InterceptorFactory<A, R> for AccessInterceptorFactory {
    fn create(
        &self,
        action: &Action,
    ) -> Result<Option<Arc<dyn Interceptor<A, R>>>, ConfigurationError> {
        Ok(self
            .create_access_interceptor(action)?
            .map(|interceptor| interceptor as Arc<dyn Interceptor<A, R>>))
    }
}
