//! Domain models for the access control module.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

static AUTHENTICATED_TAG: AnnotationTag = AnnotationTag::AUTHENTICATED;
static UNAUTHENTICATED_TAG: AnnotationTag = AnnotationTag::UNAUTHENTICATED;

/// Identifier of an annotation type.
///
/// Tags are compared exactly. `Authenticated` and `Unauthenticated` are
/// reserved for the built-in annotations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationTag(Cow<'static, str>);

impl AnnotationTag {
    /// Built-in annotation: any authenticated caller, optionally narrowed by services/roles.
    pub const AUTHENTICATED: Self = Self::from_static("Authenticated");

    /// Built-in annotation: the action is public and never checked.
    pub const UNAUTHENTICATED: Self = Self::from_static("Unauthenticated");

    #[must_use]
    pub const fn from_static(tag: &'static str) -> Self {
        Self(Cow::Borrowed(tag))
    }

    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(Cow::Owned(tag.into()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this tag names one of the two built-in annotations.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        *self == Self::AUTHENTICATED || *self == Self::UNAUTHENTICATED
    }
}

impl fmt::Display for AnnotationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for AnnotationTag {
    fn from(tag: &'static str) -> Self {
        Self::from_static(tag)
    }
}

impl From<String> for AnnotationTag {
    fn from(tag: String) -> Self {
        Self::new(tag)
    }
}

/// An annotation instance declared on an action.
///
/// `Authenticated` carries its own services and roles. Any other access
/// annotation is a `Marker` whose services and roles come from the matching
/// registry entry; a marker without a registry entry is not an access
/// annotation and is ignored during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    Authenticated {
        services: Vec<String>,
        roles: Vec<String>,
    },
    Unauthenticated,
    Marker(AnnotationTag),
}

impl Annotation {
    /// `Authenticated` without restrictions: any authenticated caller.
    #[must_use]
    pub fn authenticated() -> Self {
        Self::Authenticated {
            services: Vec::new(),
            roles: Vec::new(),
        }
    }

    /// `Authenticated` restricted to the given services and roles.
    #[must_use]
    pub fn authenticated_with<S, R>(services: S, roles: R) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self::Authenticated {
            services: services.into_iter().map(Into::into).collect(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn unauthenticated() -> Self {
        Self::Unauthenticated
    }

    /// Annotation by tag. The reserved tags yield the built-in variants.
    #[must_use]
    pub fn marker(tag: impl Into<AnnotationTag>) -> Self {
        let tag = tag.into();
        if tag == AnnotationTag::AUTHENTICATED {
            Self::authenticated()
        } else if tag == AnnotationTag::UNAUTHENTICATED {
            Self::Unauthenticated
        } else {
            Self::Marker(tag)
        }
    }

    /// Type tag of this annotation instance.
    #[must_use]
    pub fn tag(&self) -> &AnnotationTag {
        match self {
            Self::Authenticated { .. } => &AUTHENTICATED_TAG,
            Self::Unauthenticated => &UNAUTHENTICATED_TAG,
            Self::Marker(tag) => tag,
        }
    }
}

/// Access-relevant metadata of a request handler.
///
/// Declared once when the handler is registered and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    name: String,
    annotations: Vec<Annotation>,
}

impl Action {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotations: Vec::new(),
        }
    }

    /// Declare another annotation on the action.
    #[must_use]
    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Annotations in declaration order.
    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

/// Services and roles allowed by one access annotation type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessAnnotationEntry {
    annotation: AnnotationTag,
    services: BTreeSet<String>,
    roles: BTreeSet<String>,
}

impl AccessAnnotationEntry {
    #[must_use]
    pub fn new<S, R>(annotation: impl Into<AnnotationTag>, services: S, roles: R) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            annotation: annotation.into(),
            services: services.into_iter().map(Into::into).collect(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn annotation(&self) -> &AnnotationTag {
        &self.annotation
    }

    #[must_use]
    pub fn services(&self) -> &BTreeSet<String> {
        &self.services
    }

    #[must_use]
    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    /// An entry with neither services nor roles admits any authenticated caller.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.services.is_empty() && self.roles.is_empty()
    }
}

/// Allow-sets an action requires from its caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    allowed_services: BTreeSet<String>,
    allowed_roles: BTreeSet<String>,
}

impl AccessPolicy {
    #[must_use]
    pub fn new(allowed_services: BTreeSet<String>, allowed_roles: BTreeSet<String>) -> Self {
        Self {
            allowed_services,
            allowed_roles,
        }
    }

    #[must_use]
    pub fn allowed_services(&self) -> &BTreeSet<String> {
        &self.allowed_services
    }

    #[must_use]
    pub fn allowed_roles(&self) -> &BTreeSet<String> {
        &self.allowed_roles
    }

    /// No service or role restriction: any authenticated caller is allowed.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.allowed_services.is_empty() && self.allowed_roles.is_empty()
    }
}

impl From<&AccessAnnotationEntry> for AccessPolicy {
    fn from(entry: &AccessAnnotationEntry) -> Self {
        Self::new(entry.services.clone(), entry.roles.clone())
    }
}

/// Outcome of resolving an action's annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPolicy {
    /// The action is public; no authorization check is attached.
    Bypass,
    /// Callers must satisfy the policy.
    Check(AccessPolicy),
}

impl ResolvedPolicy {
    #[must_use]
    pub fn is_bypass(&self) -> bool {
        matches!(self, Self::Bypass)
    }
}
