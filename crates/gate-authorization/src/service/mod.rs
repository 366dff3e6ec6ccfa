//! Service layer: the evaluation engines and the facade over them.

pub mod authorization_service;
pub mod check_engine;
pub mod cooldown_engine;
mod guard;

pub use authorization_service::AuthorizationService;
pub use check_engine::{CheckEngine, CheckRun};
pub use cooldown_engine::CooldownEngine;
