//! Outbound Ports (Driven Ports)
//!
//! Capabilities the pipeline consumes from the surrounding framework:
//! user-supplied check and cooldown policies, and a dependency-resolution
//! facility passed through untouched to every policy.

use std::any::{Any, TypeId};
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::check::CheckOutcome;
use crate::domain::cooldown::{BucketType, CooldownOutcome};
use crate::domain::tree::{Command, PolicyBinding};
use crate::error::{ConfigurationError, PolicyFault};

/// Context types the engines can carry across concurrent evaluations.
pub trait GateContext: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> GateContext for T {}

/// Dependency-resolution facility handed to policies.
pub trait ServiceProvider: Send + Sync {
    /// Resolve a service by type id.
    fn get_service(&self, type_id: TypeId) -> Option<Arc<dyn Any + Send + Sync>>;
}

impl dyn ServiceProvider + '_ {
    /// Resolve a service by type.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.get_service(TypeId::of::<T>())
            .and_then(|service| service.downcast::<T>().ok())
    }
}

/// Everything a policy sees while evaluating.
pub struct PolicyInvocation<'a, C> {
    /// Invocation context, opaque to the pipeline
    pub context: &'a C,
    /// Dependency resolution
    pub provider: &'a dyn ServiceProvider,
    /// Command being authorized
    pub command: &'a Command<C>,
    /// Where this policy is attached
    pub binding: &'a PolicyBinding,
}

/// A boolean precondition attached to a grouping or a command.
///
/// Instances are shared across concurrent invocations. Any mutable state a
/// policy keeps is its own synchronization responsibility.
#[async_trait]
pub trait CheckPolicy<C>: Send + Sync {
    /// Name used in rejection messages
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Group key; `None` makes the check an independent mandatory gate.
    fn group(&self) -> Option<&str> {
        None
    }

    /// Called once while the command tree is frozen, with the finished owner.
    fn bind(&self, _binding: &PolicyBinding) -> Result<(), ConfigurationError> {
        Ok(())
    }

    async fn evaluate(
        &self,
        invocation: &PolicyInvocation<'_, C>,
    ) -> Result<CheckOutcome, PolicyFault>;
}

/// A rate-limit bucket strategy attached to a command.
#[async_trait]
pub trait CooldownPolicy<C>: Send + Sync {
    /// Name used in fault reports
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Dimension this policy limits
    fn bucket_type(&self) -> &BucketType;

    /// Called once while the command tree is frozen, with the finished owner.
    fn bind(&self, _binding: &PolicyBinding) -> Result<(), ConfigurationError> {
        Ok(())
    }

    async fn evaluate(
        &self,
        invocation: &PolicyInvocation<'_, C>,
    ) -> Result<CooldownOutcome, PolicyFault>;
}
