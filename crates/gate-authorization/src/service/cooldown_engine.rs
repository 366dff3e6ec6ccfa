//! Cooldown Evaluation Engine
//!
//! Cooldowns are evaluated one at a time in declaration order, so a policy
//! instance is never entered twice by the same run and hot buckets come back
//! in declaration order.

use tracing::{debug, warn};

use crate::domain::config::GateConfig;
use crate::domain::cooldown::CooldownOutcome;
use crate::domain::tree::Command;
use crate::error::GateError;
use crate::ports::outbound::{GateContext, PolicyInvocation, ServiceProvider};
use crate::service::guard::Guard;

/// Evaluates a command's cooldown buckets.
#[derive(Clone, Copy, Debug)]
pub struct CooldownEngine {
    guard: Guard,
}

impl CooldownEngine {
    pub fn new(config: &GateConfig) -> Self {
        Self {
            guard: Guard {
                timeout: config.cooldown_timeout,
                catch_panics: config.catch_panics,
            },
        }
    }

    /// Evaluate every cooldown and collect the hot buckets.
    ///
    /// # Errors
    /// `GateError::CooldownFault` for the first policy that cannot report
    /// its bucket state. Later policies are not evaluated.
    pub async fn run<C: GateContext>(
        &self,
        command: &Command<C>,
        context: &C,
        provider: &dyn ServiceProvider,
    ) -> Result<Vec<CooldownOutcome>, GateError> {
        let mut hot = Vec::new();

        for cooldown in command.cooldowns() {
            let invocation = PolicyInvocation {
                context,
                provider,
                command,
                binding: cooldown.binding(),
            };

            let outcome = self
                .guard
                .run(cooldown.policy().evaluate(&invocation))
                .await
                .map_err(|fault| {
                    warn!(
                        command = %command.name(),
                        cooldown = %cooldown.name(),
                        error = %fault,
                        "Cooldown policy faulted"
                    );
                    GateError::CooldownFault {
                        command: command.name().to_owned(),
                        policy: cooldown.name().to_owned(),
                        source: fault,
                    }
                })?;

            if !outcome.is_successful() {
                debug!(
                    command = %command.name(),
                    bucket = %cooldown.policy().bucket_type(),
                    retry_after_ms = outcome.retry_after().as_millis() as u64,
                    "Cooldown bucket is hot"
                );
                hot.push(outcome);
            }
        }

        Ok(hot)
    }
}
