#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
pub mod caller;

pub use caller::{Caller, CallerBuilder};
