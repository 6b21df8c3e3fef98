//! Registry of access annotation entries.

use std::collections::HashMap;

use access_control_sdk::{AccessAnnotationEntry, AnnotationTag, ConfigurationError};
use tracing::{debug, warn};

/// Append-only set of registered access annotation entries.
///
/// Populated during startup, then shared read-only (usually behind an `Arc`)
/// by every resolver and interceptor factory. The built-in `Authenticated`
/// and `Unauthenticated` annotations are always known and cannot be
/// registered again.
#[derive(Debug, Default, Clone)]
pub struct AccessAnnotationRegistry {
    entries: Vec<AccessAnnotationEntry>,
    index: HashMap<AnnotationTag, usize>,
}

impl AccessAnnotationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from entries, in order.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAccessAnnotationEntry` for the first repeated or
    /// reserved tag.
    pub fn from_entries<I>(entries: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = AccessAnnotationEntry>,
    {
        let mut registry = Self::new();
        for entry in entries {
            registry.register(entry)?;
        }
        Ok(registry)
    }

    /// Register an entry.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAccessAnnotationEntry` if the tag is a built-in or
    /// already registered.
    pub fn register(&mut self, entry: AccessAnnotationEntry) -> Result<(), ConfigurationError> {
        let tag = entry.annotation();
        if tag.is_builtin() || self.index.contains_key(tag) {
            return Err(ConfigurationError::DuplicateAccessAnnotationEntry {
                annotation: tag.clone(),
            });
        }

        if entry.is_unrestricted() {
            warn!(
                annotation = %tag,
                "Access annotation entry has no services and no roles; any authenticated caller is allowed"
            );
        }
        debug!(
            annotation = %tag,
            services = entry.services().len(),
            roles = entry.roles().len(),
            "Registered access annotation entry"
        );

        self.index.insert(tag.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Exact-match lookup of a registered entry.
    #[must_use]
    pub fn get(&self, annotation: &AnnotationTag) -> Option<&AccessAnnotationEntry> {
        self.index.get(annotation).and_then(|&i| self.entries.get(i))
    }

    /// Registered entries in registration order.
    #[must_use]
    pub fn entries(&self) -> &[AccessAnnotationEntry] {
        &self.entries
    }

    /// Every annotation an action may use: built-ins first, then registered
    /// tags in registration order.
    #[must_use]
    pub fn known_annotations(&self) -> Vec<AnnotationTag> {
        [AnnotationTag::AUTHENTICATED, AnnotationTag::UNAUTHENTICATED]
            .into_iter()
            .chain(self.entries.iter().map(|e| e.annotation().clone()))
            .collect()
    }

    /// Number of registered entries, built-ins excluded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
