//! Domain layer for the access control module.

pub mod factory;
pub mod interceptor;
pub mod registry;
pub mod resolver;

pub use factory::AccessInterceptorFactory;
pub use interceptor::AccessInterceptor;
pub use registry::AccessAnnotationRegistry;
pub use resolver::PolicyResolver;
