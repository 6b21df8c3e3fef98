//! Error types for the access control module.

use thiserror::Error;

use crate::models::AnnotationTag;

/// Errors raised while registering access annotations or resolving an
/// action's policy.
///
/// These are startup failures: an action that fails to resolve must never
/// serve traffic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// More than one access annotation applies to the action.
    #[error(
        "only one access annotation is permitted on an action; remove all but one from {action}: [{}]",
        join_tags(.annotations)
    )]
    AmbiguousAccessAnnotation {
        action: String,
        annotations: Vec<AnnotationTag>,
    },

    /// No access annotation with a known entry applies to the action.
    #[error(
        "{action} must be annotated with one of the known access annotations: [{}]; \
         or register an access annotation entry for one of its declared annotations: [{}]{}",
        join_tags(.known),
        join_tags(.declared),
        suggest_entry(.declared)
    )]
    MissingAccessAnnotation {
        action: String,
        /// Every annotation type known when resolution ran, built-ins first.
        known: Vec<AnnotationTag>,
        /// Every annotation declared on the action, access-related or not.
        declared: Vec<AnnotationTag>,
    },

    /// An entry was registered for a tag that is already known.
    #[error("access annotation entry for {annotation} is already registered")]
    DuplicateAccessAnnotationEntry { annotation: AnnotationTag },
}

/// Per-request access denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    /// No caller identity is attached to the request.
    #[error("unauthenticated")]
    Unauthenticated,

    /// The caller matches neither the allowed services nor the allowed roles.
    #[error("unauthorized")]
    Unauthorized,
}

/// Failure of an interceptor stage.
#[derive(Debug, Error)]
pub enum InterceptError {
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    /// Failure raised by an interceptor other than the access interceptor.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl InterceptError {
    /// The access denial, if this failure is one.
    #[must_use]
    pub fn as_authorization(&self) -> Option<AuthorizationError> {
        match self {
            Self::Authorization(err) => Some(*err),
            Self::Other(_) => None,
        }
    }
}

/// Points at the first declared tag that looks like an access annotation.
fn suggest_entry(declared: &[AnnotationTag]) -> String {
    declared
        .iter()
        .find(|tag| tag.as_str().ends_with("Access"))
        .map(|tag| format!(", e.g. an entry for {tag} with its services and roles"))
        .unwrap_or_default()
}

fn join_tags(tags: &[AnnotationTag]) -> String {
    tags.iter()
        .map(AnnotationTag::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
