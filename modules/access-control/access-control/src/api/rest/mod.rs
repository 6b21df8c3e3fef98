//! axum integration: per-route access checks.

mod middleware;
pub mod problem;
pub mod router;

pub use problem::Problem;
pub use router::{AccessRouter, RouteRegistrationError};
