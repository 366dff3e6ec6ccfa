//! Closure-backed check policy.

use async_trait::async_trait;

use crate::domain::check::CheckOutcome;
use crate::error::PolicyFault;
use crate::ports::outbound::{CheckPolicy, GateContext, PolicyInvocation};

type Predicate<C> = Box<dyn Fn(&PolicyInvocation<'_, C>) -> CheckOutcome + Send + Sync>;

/// A named, optionally grouped check backed by a synchronous closure.
///
/// ```ignore
/// let guild_only = FnCheck::new("guild-only", |inv: &PolicyInvocation<'_, Ctx>| {
///     inv.context.guild.is_some().into()
/// });
/// let owner = FnCheck::new("owner", is_owner).in_group("staff");
/// ```
pub struct FnCheck<C> {
    name: String,
    group: Option<String>,
    predicate: Predicate<C>,
}

impl<C> FnCheck<C> {
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&PolicyInvocation<'_, C>) -> CheckOutcome + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            group: None,
            predicate: Box::new(predicate),
        }
    }

    /// Place the check in a named group.
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

#[async_trait]
impl<C: GateContext> CheckPolicy<C> for FnCheck<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    async fn evaluate(
        &self,
        invocation: &PolicyInvocation<'_, C>,
    ) -> Result<CheckOutcome, PolicyFault> {
        Ok((self.predicate)(invocation))
    }
}
