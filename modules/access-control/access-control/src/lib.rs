#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Access Control Module
//!
//! Decides, per request, whether a caller may invoke an action.
//!
//! Every action declares exactly one access annotation. At registration
//! time the annotation is resolved against the [`AccessAnnotationRegistry`]:
//!
//! - `Unauthenticated` - the action is public and gets no interceptor
//! - `Authenticated` - any caller, optionally narrowed to services/roles
//!   given on the annotation itself
//! - a registered custom annotation - the services/roles of its entry
//!
//! Zero or several access annotations on one action fail registration.
//!
//! At request time the [`AccessInterceptor`] checks the caller: absent
//! caller is `Unauthenticated`; a caller whose service or one of whose roles
//! is allowed passes; anyone else is `Unauthorized`.
//!
//! ## Configuration
//!
//! ```yaml
//! modules:
//!   access-control:
//!     config:
//!       deny_unregistered_routes: true
//!       entries:
//!         - annotation: AdminAccess
//!           roles: [admin]
//! ```

pub mod api;
pub mod config;
pub mod domain;
pub mod module;
pub mod pipeline;

pub use api::rest::{AccessRouter, Problem, RouteRegistrationError};
pub use config::{AccessAnnotationEntryConfig, AccessControlConfig, ConfigError};
pub use domain::{
    AccessAnnotationRegistry, AccessInterceptor, AccessInterceptorFactory, PolicyResolver,
};
pub use module::AccessControl;
pub use pipeline::ActionPipeline;
