//! Router builder that registers each route together with its access policy.

use std::collections::HashMap;
use std::sync::Arc;

use access_control_sdk::{Action, ConfigurationError};
use axum::Router;
use axum::handler::Handler;
use axum::routing::MethodRouter;
use http::Method;
use tracing::{debug, error};

use super::middleware::{AccessState, RouteMatcher, access_middleware};
use crate::domain::AccessInterceptorFactory;

/// Errors raised while registering a route.
#[derive(Debug, thiserror::Error)]
pub enum RouteRegistrationError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("cannot register {method} {path}: {source}")]
    Conflict {
        method: Method,
        path: String,
        #[source]
        source: matchit::InsertError,
    },

    #[error("unsupported method {0}")]
    UnsupportedMethod(Method),
}

/// Builds an axum [`Router`] whose routes are all bound to a resolved access
/// policy.
///
/// Each [`route`](Self::route) call resolves the route's [`Action`] right
/// away, so a misconfigured action fails registration instead of a request.
///
/// ```ignore
/// let router = access_control
///     .router::<()>()
///     .route(Method::GET, "/health", &health_action, health)?
///     .route(Method::DELETE, "/users/{id}", &delete_action, delete_user)?
///     .into_router();
/// ```
pub struct AccessRouter<S = ()> {
    router: Router<S>,
    factory: AccessInterceptorFactory,
    routes: HashMap<Method, RouteMatcher>,
    route_count: usize,
    deny_unregistered_routes: bool,
}

impl<S> AccessRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(factory: AccessInterceptorFactory, deny_unregistered_routes: bool) -> Self {
        Self {
            router: Router::new(),
            factory,
            routes: HashMap::new(),
            route_count: 0,
            deny_unregistered_routes,
        }
    }

    /// Register `handler` for `method` and `path` under `action`'s access policy.
    ///
    /// # Errors
    ///
    /// - `Configuration` if the action's access annotations do not resolve
    /// - `Conflict` if the path clashes with an already registered one
    /// - `UnsupportedMethod` for methods other than GET, POST, PUT, PATCH, DELETE
    pub fn route<H, T>(
        mut self,
        method: Method,
        path: &str,
        action: &Action,
        handler: H,
    ) -> Result<Self, RouteRegistrationError>
    where
        H: Handler<T, S>,
        T: 'static,
    {
        let method_router: MethodRouter<S> = match method {
            Method::GET => axum::routing::get(handler),
            Method::POST => axum::routing::post(handler),
            Method::PUT => axum::routing::put(handler),
            Method::PATCH => axum::routing::patch(handler),
            Method::DELETE => axum::routing::delete(handler),
            _ => return Err(RouteRegistrationError::UnsupportedMethod(method)),
        };

        let access = self.factory.create_access_interceptor(action)?;
        let public = access.is_none();

        self.routes
            .entry(method.clone())
            .or_insert_with(RouteMatcher::new)
            .insert(path, access)
            .map_err(|source| {
                error!(%method, path, "Route conflicts with an already registered route");
                RouteRegistrationError::Conflict {
                    method: method.clone(),
                    path: path.to_owned(),
                    source,
                }
            })?;

        debug!(%method, path, action = action.name(), public, "Registered route");
        self.route_count += 1;
        self.router = self.router.route(path, method_router);
        Ok(self)
    }

    /// Number of registered routes across all methods.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.route_count
    }

    /// Finish registration and attach the access middleware.
    #[must_use]
    pub fn into_router(self) -> Router<S> {
        let state = AccessState::new(Arc::new(self.routes), self.deny_unregistered_routes);
        self.router
            .layer(axum::middleware::from_fn_with_state(state, access_middleware))
    }
}
