#![allow(clippy::unwrap_used, clippy::expect_used)]

//! HTTP-level checks of routes registered through `AccessRouter`.

use access_control::{AccessControl, AccessControlConfig, RouteRegistrationError};
use access_control_sdk::{Action, Annotation, Caller, ConfigurationError};
use axum::Router;
use axum::body::Body;
use axum::extract::Path;
use http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

fn module(deny_unregistered_routes: bool) -> AccessControl {
    let cfg = AccessControlConfig::from_value(json!({
        "deny_unregistered_routes": deny_unregistered_routes,
        "entries": [
            { "annotation": "AdminAccess", "roles": ["admin"] },
        ]
    }))
    .unwrap();
    AccessControl::from_config(&cfg).unwrap()
}

async fn health() -> &'static str {
    "ok"
}

async fn get_user(Path(id): Path<String>) -> String {
    format!("user {id}")
}

async fn delete_user() -> StatusCode {
    StatusCode::NO_CONTENT
}

fn app(deny_unregistered_routes: bool) -> Router {
    let health_action = Action::new("HealthApi::get").annotated(Annotation::unauthenticated());
    let get_action = Action::new("UsersApi::get")
        .annotated(Annotation::authenticated_with(["directory"], ["reader"]));
    let delete_action = Action::new("UsersApi::delete").annotated(Annotation::marker("AdminAccess"));

    module(deny_unregistered_routes)
        .router()
        .route(Method::GET, "/health", &health_action, health)
        .unwrap()
        .route(Method::GET, "/users/{id}", &get_action, get_user)
        .unwrap()
        .route(Method::DELETE, "/users/{id}", &delete_action, delete_user)
        .unwrap()
        .into_router()
}

fn request(method: Method, uri: &str, caller: Option<Caller>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(caller) = caller {
        builder = builder.extension(caller);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn public_route_needs_no_caller() {
    let response = app(true)
        .oneshot(request(Method::GET, "/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn guarded_route_without_caller_is_unauthenticated() {
    let response = app(true)
        .oneshot(request(Method::GET, "/users/42", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(http::header::CONTENT_TYPE).unwrap(),
        "application/problem+json"
    );
    let body = body_json(response).await;
    assert_eq!(body["status"], 401);
    assert_eq!(body["title"], "Unauthorized");
}

#[tokio::test]
async fn guarded_route_rejects_other_service() {
    let response = app(true)
        .oneshot(request(
            Method::GET,
            "/users/42",
            Some(Caller::service("billing")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["status"], 403);
}

#[tokio::test]
async fn guarded_route_admits_allowed_service() {
    let response = app(true)
        .oneshot(request(
            Method::GET,
            "/users/42",
            Some(Caller::service("directory")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"user 42");
}

#[tokio::test]
async fn guarded_route_admits_allowed_role() {
    let caller = Caller::builder().user("alice").role("reader").build();
    let response = app(true)
        .oneshot(request(Method::GET, "/users/7", Some(caller)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn registered_entry_guards_its_route() {
    let reader = Caller::builder().user("alice").role("reader").build();
    let response = app(true)
        .oneshot(request(Method::DELETE, "/users/7", Some(reader)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin = Caller::builder().user("root").role("admin").build();
    let response = app(true)
        .oneshot(request(Method::DELETE, "/users/7", Some(admin)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn unregistered_route_is_denied_by_default() {
    let response = app(true)
        .oneshot(request(Method::POST, "/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unregistered_route_passes_through_when_allowed() {
    let response = app(false)
        .oneshot(request(Method::POST, "/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn head_is_checked_like_get() {
    for deny_unregistered_routes in [true, false] {
        let response = app(deny_unregistered_routes)
            .oneshot(request(Method::HEAD, "/users/42", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app(deny_unregistered_routes)
            .oneshot(request(
                Method::HEAD,
                "/users/42",
                Some(Caller::service("billing")),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app(deny_unregistered_routes)
            .oneshot(request(
                Method::HEAD,
                "/users/42",
                Some(Caller::service("directory")),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn preflight_is_not_checked() {
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/users/42")
        .header(http::header::ORIGIN, "https://example.com")
        .header(http::header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();

    let response = app(true).oneshot(req).await.unwrap();

    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
    assert_ne!(response.status(), StatusCode::FORBIDDEN);
}

#[test]
fn misconfigured_action_fails_registration() {
    let module = module(true);

    let missing = Action::new("ReportsApi::export");
    let Err(err) = module
        .router::<()>()
        .route(Method::GET, "/reports", &missing, health)
    else {
        panic!("expected registration to fail");
    };
    assert!(matches!(
        err,
        RouteRegistrationError::Configuration(ConfigurationError::MissingAccessAnnotation { .. })
    ));

    let ambiguous = Action::new("ReportsApi::export")
        .annotated(Annotation::authenticated())
        .annotated(Annotation::marker("AdminAccess"));
    let Err(err) = module
        .router::<()>()
        .route(Method::GET, "/reports", &ambiguous, health)
    else {
        panic!("expected registration to fail");
    };
    assert!(matches!(
        err,
        RouteRegistrationError::Configuration(
            ConfigurationError::AmbiguousAccessAnnotation { .. }
        )
    ));
}

#[test]
fn duplicate_route_is_a_conflict() {
    let module = module(true);
    let action = Action::new("HealthApi::get").annotated(Annotation::unauthenticated());

    let Err(err) = module
        .router::<()>()
        .route(Method::GET, "/health", &action, health)
        .unwrap()
        .route(Method::GET, "/health", &action, health)
    else {
        panic!("expected registration to fail");
    };
    assert!(matches!(err, RouteRegistrationError::Conflict { .. }));
}

#[test]
fn unsupported_method_is_rejected() {
    let module = module(true);
    let action = Action::new("HealthApi::head").annotated(Annotation::unauthenticated());

    let Err(err) = module
        .router::<()>()
        .route(Method::HEAD, "/health", &action, health)
    else {
        panic!("expected registration to fail");
    };
    assert!(matches!(err, RouteRegistrationError::UnsupportedMethod(m) if m == Method::HEAD));
}

#[test]
fn route_count_tracks_registrations() {
    let module = module(true);
    let action = Action::new("HealthApi::get").annotated(Annotation::unauthenticated());

    let router = module
        .router::<()>()
        .route(Method::GET, "/health", &action, health)
        .unwrap()
        .route(Method::POST, "/health", &action, health)
        .unwrap();

    assert_eq!(router.route_count(), 2);
}
