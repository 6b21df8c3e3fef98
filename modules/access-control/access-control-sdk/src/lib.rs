#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Access Control SDK
//!
//! This crate provides the public API for the `access_control` module:
//!
//! - [`Action`], [`Annotation`], [`AnnotationTag`] - Declared handler metadata
//! - [`AccessAnnotationEntry`] - Services and roles of one access annotation type
//! - [`ResolvedPolicy`], [`AccessPolicy`] - Outcome of policy resolution
//! - [`Interceptor`], [`InterceptorFactory`], [`Chain`] - Pipeline contracts
//! - [`ConfigurationError`], [`AuthorizationError`], [`InterceptError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use access_control_sdk::{Action, Annotation};
//!
//! let action = Action::new("InvoicesApi::list")
//!     .annotated(Annotation::authenticated_with(["billing"], ["admin"]));
//!
//! let interceptor = factory.create(&action)?;
//! ```

pub mod api;
pub mod error;
pub mod models;

pub use api::{Chain, Handler, Interceptor, InterceptorFactory};
pub use error::{AuthorizationError, ConfigurationError, InterceptError};
pub use models::{
    AccessAnnotationEntry, AccessPolicy, Action, Annotation, AnnotationTag, ResolvedPolicy,
};

pub use access_security::Caller;
