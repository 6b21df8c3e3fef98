use std::collections::BTreeSet;

/// `Caller` is the identity resolved for a single request.
///
/// Built by the authentication layer and attached to the request before it
/// reaches the access interceptor. Access control only ever reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Caller {
    /// Calling service, set for service-to-service requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    service: Option<String>,
    /// Calling user, set for requests made on behalf of a person.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    /// Roles granted to the caller.
    #[serde(default)]
    roles: BTreeSet<String>,
}

impl Caller {
    /// Create a new `Caller` builder
    #[must_use]
    pub fn builder() -> CallerBuilder {
        CallerBuilder::default()
    }

    /// Shorthand for a service caller without roles.
    #[must_use]
    pub fn service(service: &str) -> Self {
        CallerBuilder::default().service(service).build()
    }

    /// Calling service identifier, if any.
    #[must_use]
    pub fn service_name(&self) -> Option<&str> {
        self.service.as_deref()
    }

    /// Calling user identifier, if any.
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    #[must_use]
    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// The identity to report in logs: the service if present, otherwise the user.
    #[must_use]
    pub fn principal(&self) -> Option<&str> {
        self.service.as_deref().or(self.user.as_deref())
    }
}

#[derive(Default)]
pub struct CallerBuilder {
    service: Option<String>,
    user: Option<String>,
    roles: BTreeSet<String>,
}

impl CallerBuilder {
    #[must_use]
    pub fn service(mut self, service: &str) -> Self {
        self.service = Some(service.to_owned());
        self
    }

    #[must_use]
    pub fn user(mut self, user: &str) -> Self {
        self.user = Some(user.to_owned());
        self
    }

    #[must_use]
    pub fn role(mut self, role: &str) -> Self {
        self.roles.insert(role.to_owned());
        self
    }

    #[must_use]
    pub fn roles<I, T>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn build(self) -> Caller {
        Caller {
            service: self.service,
            user: self.user,
            roles: self.roles,
        }
    }
}
