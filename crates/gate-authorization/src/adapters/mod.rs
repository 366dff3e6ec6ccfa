//! Adapters: built-in policies and dependency-resolution facilities.

pub mod fn_check;
pub mod rate_limit;
pub mod services;

pub use fn_check::FnCheck;
pub use rate_limit::{cleanup_task, RateLimitCooldown};
pub use services::{EmptyServiceProvider, ServiceMap};
