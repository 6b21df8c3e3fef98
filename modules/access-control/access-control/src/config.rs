//! Configuration for the access control module.

use std::path::Path;

use access_control_sdk::{AccessAnnotationEntry, AnnotationTag, ConfigurationError};
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use serde::{Deserialize, Serialize};

use crate::domain::AccessAnnotationRegistry;

fn default_deny_unregistered_routes() -> bool {
    true
}

/// Access control configuration.
///
/// ```yaml
/// access-control:
///   config:
///     deny_unregistered_routes: true
///     entries:
///       - annotation: AdminAccess
///         roles: [admin, ops]
///       - annotation: BillingAccess
///         services: [billing]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccessControlConfig {
    /// Registered access annotation entries, in registration order.
    pub entries: Vec<AccessAnnotationEntryConfig>,

    /// If true, REST requests that match no registered action are answered
    /// with 403 instead of reaching the router.
    #[serde(default = "default_deny_unregistered_routes")]
    pub deny_unregistered_routes: bool,
}

impl Default for AccessControlConfig {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            deny_unregistered_routes: default_deny_unregistered_routes(),
        }
    }
}

/// One access annotation entry as written in configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AccessAnnotationEntryConfig {
    pub annotation: String,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl From<&AccessAnnotationEntryConfig> for AccessAnnotationEntry {
    fn from(cfg: &AccessAnnotationEntryConfig) -> Self {
        Self::new(
            AnnotationTag::new(cfg.annotation.as_str()),
            cfg.services.iter().cloned(),
            cfg.roles.iter().cloned(),
        )
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load access control configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid access control configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Registry(#[from] ConfigurationError),
}

impl AccessControlConfig {
    /// Environment variable prefix; `__` separates nested keys.
    pub const ENV_PREFIX: &'static str = "ACCESS_CONTROL_";

    /// Deserialize the module's config section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the value does not match the schema.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Load from a YAML file, overridden by `ACCESS_CONTROL_*` environment
    /// variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Figment::new()
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(Self::ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Build the registry described by `entries`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Registry` on a duplicate or reserved annotation.
    pub fn build_registry(&self) -> Result<AccessAnnotationRegistry, ConfigError> {
        Ok(AccessAnnotationRegistry::from_entries(
            self.entries.iter().map(AccessAnnotationEntry::from),
        )?)
    }
}
