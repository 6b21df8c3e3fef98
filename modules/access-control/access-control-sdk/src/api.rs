//! Interceptor chain contracts.
//!
//! An action's handler is wrapped by an ordered list of [`Interceptor`]s.
//! Each stage receives a [`Chain`] and either calls [`Chain::proceed`] to hand
//! the untouched arguments to the next stage, or returns an error and stops
//! the request.
//!
//! ```ignore
//! impl<A, R> Interceptor<A, R> for AuditInterceptor {
//!     fn intercept(&self, chain: Chain<'_, A, R>) -> Result<R, InterceptError> {
//!         tracing::info!(action = chain.action().name(), "call");
//!         chain.proceed()
//!     }
//! }
//! ```

use std::sync::Arc;

use access_security::Caller;

use crate::error::{ConfigurationError, InterceptError};
use crate::models::Action;

/// Terminal stage of a chain.
pub type Handler<A, R> = dyn Fn(A) -> R + Send + Sync;

/// One stage of an action's interceptor chain.
///
/// Implementations hold only immutable configuration and are shared across
/// concurrent requests.
pub trait Interceptor<A, R>: Send + Sync {
    /// Run this stage.
    ///
    /// # Errors
    ///
    /// Returns an error when the request must not reach the next stage.
    fn intercept(&self, chain: Chain<'_, A, R>) -> Result<R, InterceptError>;
}

/// Builds the interceptor for an action at registration time.
pub trait InterceptorFactory<A, R>: Send + Sync {
    /// `Ok(None)` means the action gets no interceptor from this factory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` when the action's metadata is unusable;
    /// the action must then not be registered.
    fn create(
        &self,
        action: &Action,
    ) -> Result<Option<Arc<dyn Interceptor<A, R>>>, ConfigurationError>;
}

/// The remainder of an action's pipeline for one request.
pub struct Chain<'a, A, R> {
    action: &'a Action,
    caller: Option<&'a Caller>,
    args: A,
    stages: &'a [Arc<dyn Interceptor<A, R>>],
    handler: &'a Handler<A, R>,
}

impl<'a, A, R> Chain<'a, A, R> {
    #[must_use]
    pub fn new(
        action: &'a Action,
        caller: Option<&'a Caller>,
        args: A,
        stages: &'a [Arc<dyn Interceptor<A, R>>],
        handler: &'a Handler<A, R>,
    ) -> Self {
        Self {
            action,
            caller,
            args,
            stages,
            handler,
        }
    }

    #[must_use]
    pub fn action(&self) -> &'a Action {
        self.action
    }

    /// Caller identity of the current request, if one was resolved.
    #[must_use]
    pub fn caller(&self) -> Option<&'a Caller> {
        self.caller
    }

    #[must_use]
    pub fn args(&self) -> &A {
        &self.args
    }

    /// Hand the arguments, unchanged, to the next stage and return its result.
    ///
    /// # Errors
    ///
    /// Propagates the error of any later stage.
    pub fn proceed(self) -> Result<R, InterceptError> {
        match self.stages.split_first() {
            Some((next, rest)) => next.intercept(Chain {
                stages: rest,
                ..self
            }),
            None => Ok((self.handler)(self.args)),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::error::AuthorizationError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting(AtomicUsize);

    impl Interceptor<u32, u32> for Counting {
        fn intercept(&self, chain: Chain<'_, u32, u32>) -> Result<u32, InterceptError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            chain.proceed()
        }
    }

    struct Reject;

    impl Interceptor<u32, u32> for Reject {
        fn intercept(&self, _chain: Chain<'_, u32, u32>) -> Result<u32, InterceptError> {
            Err(AuthorizationError::Unauthorized.into())
        }
    }

    fn double(n: u32) -> u32 {
        n * 2
    }

    #[test]
    fn empty_chain_calls_handler() {
        let action = Action::new("Math::double");
        let chain = Chain::new(&action, None, 21, &[], &double);

        assert_eq!(chain.proceed().unwrap(), 42);
    }

    #[test]
    fn stages_run_in_order_before_handler() {
        let action = Action::new("Math::double");
        let first = Arc::new(Counting(AtomicUsize::new(0)));
        let second = Arc::new(Counting(AtomicUsize::new(0)));
        let stages: Vec<Arc<dyn Interceptor<u32, u32>>> = vec![first.clone(), second.clone()];

        let chain = Chain::new(&action, None, 5, &stages, &double);
        assert_eq!(chain.proceed().unwrap(), 10);
        assert_eq!(first.0.load(Ordering::SeqCst), 1);
        assert_eq!(second.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn rejecting_stage_stops_the_chain() {
        let action = Action::new("Math::double");
        let after = Arc::new(Counting(AtomicUsize::new(0)));
        let stages: Vec<Arc<dyn Interceptor<u32, u32>>> = vec![Arc::new(Reject), after.clone()];

        let chain = Chain::new(&action, None, 5, &stages, &double);
        let err = chain.proceed().unwrap_err();

        assert_eq!(err.as_authorization(), Some(AuthorizationError::Unauthorized));
        assert_eq!(after.0.load(Ordering::SeqCst), 0);
    }
}
