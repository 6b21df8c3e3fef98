//! Policy resolution: one action, exactly one access annotation.

use std::collections::BTreeSet;

use access_control_sdk::{
    AccessAnnotationEntry, AccessPolicy, Action, Annotation, AnnotationTag, ConfigurationError,
    ResolvedPolicy,
};
use tracing::debug;

use super::registry::AccessAnnotationRegistry;

/// An annotation on the action that selects an access policy.
enum Candidate<'a> {
    Authenticated {
        services: &'a [String],
        roles: &'a [String],
    },
    Unauthenticated,
    Registered(&'a AccessAnnotationEntry),
}

impl Candidate<'_> {
    fn tag(&self) -> AnnotationTag {
        match self {
            Self::Authenticated { .. } => AnnotationTag::AUTHENTICATED,
            Self::Unauthenticated => AnnotationTag::UNAUTHENTICATED,
            Self::Registered(entry) => entry.annotation().clone(),
        }
    }

    fn into_policy(self) -> ResolvedPolicy {
        match self {
            Self::Unauthenticated => ResolvedPolicy::Bypass,
            Self::Authenticated { services, roles } => ResolvedPolicy::Check(AccessPolicy::new(
                services.iter().cloned().collect::<BTreeSet<_>>(),
                roles.iter().cloned().collect::<BTreeSet<_>>(),
            )),
            Self::Registered(entry) => ResolvedPolicy::Check(AccessPolicy::from(entry)),
        }
    }
}

/// Maps an action's declared annotations onto a single [`ResolvedPolicy`].
///
/// Resolution is pure over a fixed registry, so it runs once per action at
/// registration and the result is reused for every request.
#[derive(Debug, Clone, Copy)]
pub struct PolicyResolver<'r> {
    registry: &'r AccessAnnotationRegistry,
}

impl<'r> PolicyResolver<'r> {
    #[must_use]
    pub fn new(registry: &'r AccessAnnotationRegistry) -> Self {
        Self { registry }
    }

    /// Resolve the access policy of `action`.
    ///
    /// # Errors
    ///
    /// - `AmbiguousAccessAnnotation` if more than one access annotation applies
    /// - `MissingAccessAnnotation` if none applies
    pub fn resolve(&self, action: &Action) -> Result<ResolvedPolicy, ConfigurationError> {
        let mut candidates: Vec<Candidate<'_>> = action
            .annotations()
            .iter()
            .filter_map(|annotation| self.candidate(annotation))
            .collect();

        if candidates.len() > 1 {
            return Err(ConfigurationError::AmbiguousAccessAnnotation {
                action: action.name().to_owned(),
                annotations: candidates.iter().map(Candidate::tag).collect(),
            });
        }

        let Some(candidate) = candidates.pop() else {
            return Err(ConfigurationError::MissingAccessAnnotation {
                action: action.name().to_owned(),
                known: self.registry.known_annotations(),
                declared: action
                    .annotations()
                    .iter()
                    .map(|a| a.tag().clone())
                    .collect(),
            });
        };

        let annotation = candidate.tag();
        let policy = candidate.into_policy();
        debug!(
            action = action.name(),
            annotation = %annotation,
            bypass = policy.is_bypass(),
            "Resolved access policy"
        );
        Ok(policy)
    }

    fn candidate<'a>(&'a self, annotation: &'a Annotation) -> Option<Candidate<'a>> {
        match annotation {
            Annotation::Authenticated { services, roles } => {
                Some(Candidate::Authenticated { services, roles })
            }
            Annotation::Unauthenticated => Some(Candidate::Unauthenticated),
            Annotation::Marker(tag) if *tag == AnnotationTag::AUTHENTICATED => {
                Some(Candidate::Authenticated {
                    services: &[],
                    roles: &[],
                })
            }
            Annotation::Marker(tag) if *tag == AnnotationTag::UNAUTHENTICATED => {
                Some(Candidate::Unauthenticated)
            }
            Annotation::Marker(tag) => self.registry.get(tag).map(Candidate::Registered),
        }
    }
}
