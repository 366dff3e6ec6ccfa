//! Ports layer (hexagonal architecture)

pub mod inbound;
pub mod outbound;

pub use inbound::AuthorizationApi;
pub use outbound::{CheckPolicy, CooldownPolicy, GateContext, PolicyInvocation, ServiceProvider};
