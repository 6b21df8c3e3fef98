use std::collections::HashMap;
use std::sync::Arc;

use access_security::Caller;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::{HeaderMap, Method, StatusCode};

use super::problem::Problem;
use crate::domain::AccessInterceptor;

/// Access outcome of one registered route. `None` means the action is public.
pub(crate) type RouteAccess = Option<Arc<AccessInterceptor>>;

/// Route matcher for a specific HTTP method.
#[derive(Clone)]
pub(crate) struct RouteMatcher {
    matcher: matchit::Router<RouteAccess>,
}

impl RouteMatcher {
    pub(crate) fn new() -> Self {
        Self {
            matcher: matchit::Router::new(),
        }
    }

    pub(crate) fn insert(
        &mut self,
        path: &str,
        access: RouteAccess,
    ) -> Result<(), matchit::InsertError> {
        self.matcher.insert(path, access)
    }

    fn find(&self, path: &str) -> Option<&RouteAccess> {
        self.matcher.at(path).ok().map(|m| m.value)
    }
}

/// How a request's route was classified.
#[derive(Debug)]
enum RouteDecision<'a> {
    /// Registered public route.
    Public,
    /// Registered route with an access check.
    Guarded(&'a AccessInterceptor),
    /// No registered action matches the request.
    Unregistered,
}

/// State shared by [`access_middleware`].
#[derive(Clone)]
pub(crate) struct AccessState {
    routes: Arc<HashMap<Method, RouteMatcher>>,
    deny_unregistered_routes: bool,
}

impl AccessState {
    pub(crate) fn new(
        routes: Arc<HashMap<Method, RouteMatcher>>,
        deny_unregistered_routes: bool,
    ) -> Self {
        Self {
            routes,
            deny_unregistered_routes,
        }
    }

    fn classify(&self, method: &Method, path: &str) -> RouteDecision<'_> {
        // axum answers HEAD with the GET handler, so HEAD carries GET's policy
        let method = if method == Method::HEAD {
            Method::GET
        } else {
            method.clone()
        };
        match self.routes.get(&method).and_then(|m| m.find(path)) {
            Some(Some(interceptor)) => RouteDecision::Guarded(interceptor),
            Some(None) => RouteDecision::Public,
            None => RouteDecision::Unregistered,
        }
    }
}

/// Access middleware for routes registered through `AccessRouter`.
///
/// For each request:
/// 1. Skips CORS preflight requests
/// 2. Public routes pass through untouched
/// 3. Guarded routes check the `Caller` found in request extensions (placed
///    there by the authentication layer) against the route's policy
/// 4. Unregistered routes are denied or passed through per configuration
pub(crate) async fn access_middleware(
    State(state): State<AccessState>,
    req: Request,
    next: Next,
) -> Response {
    if is_preflight_request(req.method(), req.headers()) {
        return next.run(req).await;
    }

    match state.classify(req.method(), req.uri().path()) {
        RouteDecision::Public => next.run(req).await,
        RouteDecision::Guarded(interceptor) => {
            match interceptor.authorize(req.extensions().get::<Caller>()) {
                Ok(()) => next.run(req).await,
                Err(err) => Problem::from(err).into_response(),
            }
        }
        RouteDecision::Unregistered if state.deny_unregistered_routes => {
            tracing::warn!(
                method = %req.method(),
                path = req.uri().path(),
                "Request to route without registered action denied"
            );
            Problem::new(
                StatusCode::FORBIDDEN,
                "Forbidden",
                "No access policy is registered for this route",
            )
            .into_response()
        }
        RouteDecision::Unregistered => next.run(req).await,
    }
}

/// Check if this is a CORS preflight request
///
/// Preflight requests are OPTIONS requests with:
/// - Origin header present
/// - Access-Control-Request-Method header present
fn is_preflight_request(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(http::header::ORIGIN)
        && headers.contains_key(http::header::ACCESS_CONTROL_REQUEST_METHOD)
}
