//! Per-request access check.

use access_control_sdk::{AccessPolicy, AuthorizationError, Chain, InterceptError, Interceptor};
use access_security::Caller;
use tracing::debug;

/// Checks the caller of every request to one action against its resolved
/// [`AccessPolicy`].
///
/// Only built for actions that resolved to `ResolvedPolicy::Check`; public
/// actions have no interceptor at all. Holds no mutable state, so one
/// instance serves concurrent requests.
#[derive(Debug, Clone)]
pub struct AccessInterceptor {
    action: String,
    policy: AccessPolicy,
}

impl AccessInterceptor {
    #[must_use]
    pub fn new(action: impl Into<String>, policy: AccessPolicy) -> Self {
        Self {
            action: action.into(),
            policy,
        }
    }

    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    #[must_use]
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Decide whether `caller` may invoke the action.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` if there is no caller
    /// - `Unauthorized` if the caller matches neither an allowed service nor an allowed role
    pub fn authorize(&self, caller: Option<&Caller>) -> Result<(), AuthorizationError> {
        let Some(caller) = caller else {
            debug!(action = %self.action, "Access denied: no caller");
            return Err(AuthorizationError::Unauthenticated);
        };

        if self.is_allowed(caller) {
            return Ok(());
        }

        debug!(
            action = %self.action,
            caller = caller.principal().unwrap_or("<anonymous>"),
            "Access denied: caller has no allowed service or role"
        );
        Err(AuthorizationError::Unauthorized)
    }

    fn is_allowed(&self, caller: &Caller) -> bool {
        // No restriction on service or role
        if self.policy.is_open() {
            return true;
        }

        if caller
            .service_name()
            .is_some_and(|service| self.policy.allowed_services().contains(service))
        {
            return true;
        }

        caller
            .roles()
            .iter()
            .any(|role| self.policy.allowed_roles().contains(role))
    }
}

impl<A, R> Interceptor<A, R> for AccessInterceptor {
    fn intercept(&self, chain: Chain<'_, A, R>) -> Result<R, InterceptError> {
        self.authorize(chain.caller())?;
        chain.proceed()
    }
}
