//! Inbound Ports (Driving Ports)
//!
//! The two entry points a dispatcher calls before invoking a command.

use async_trait::async_trait;

use crate::domain::{AuthResult, CommandId};
use crate::error::GateResult;
use crate::ports::outbound::ServiceProvider;

/// Authorization facade (Driving Port)
///
/// The dispatcher calls `run_checks` and proceeds only when it succeeds.
/// `run_cooldowns` is a separate, later gate; implementations do not
/// sequence the two.
#[async_trait]
pub trait AuthorizationApi<C>: Send + Sync {
    /// Evaluate the ancestor chain and the command's own checks.
    ///
    /// A missing provider defaults to an empty one.
    ///
    /// # Errors
    /// `GateError::UnknownCommand` if `command` is not part of the tree.
    async fn run_checks(
        &self,
        command: CommandId,
        context: &C,
        provider: Option<&dyn ServiceProvider>,
    ) -> GateResult<AuthResult>;

    /// Evaluate every cooldown attached to the command, in declaration order.
    ///
    /// # Errors
    /// `GateError::UnknownCommand`, or `GateError::CooldownFault` when a
    /// cooldown policy cannot report its bucket state.
    async fn run_cooldowns(
        &self,
        command: CommandId,
        context: &C,
        provider: Option<&dyn ServiceProvider>,
    ) -> GateResult<AuthResult>;
}
