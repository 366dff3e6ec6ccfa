//! Authorization Service
//!
//! Implements the `AuthorizationApi` facade over a frozen command tree.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::adapters::services::EmptyServiceProvider;
use crate::domain::config::GateConfig;
use crate::domain::results::{AuthResult, CommandOnCooldownResult};
use crate::domain::tree::{Command, CommandId, CommandTree};
use crate::error::{ConfigurationError, GateError, GateResult};
use crate::metrics::{MetricsRecorder, NoOpMetrics};
use crate::ports::inbound::AuthorizationApi;
use crate::ports::outbound::{GateContext, ServiceProvider};
use crate::service::check_engine::CheckEngine;
use crate::service::cooldown_engine::CooldownEngine;

static EMPTY_PROVIDER: EmptyServiceProvider = EmptyServiceProvider;

/// Authorization facade implementation
///
/// Shares one frozen `CommandTree` across every concurrent invocation.
pub struct AuthorizationService<C> {
    tree: Arc<CommandTree<C>>,
    checks: CheckEngine,
    cooldowns: CooldownEngine,
    metrics: Arc<dyn MetricsRecorder>,
}

impl<C: GateContext> AuthorizationService<C> {
    /// Create a service over a frozen tree.
    pub fn new(tree: Arc<CommandTree<C>>, config: &GateConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            tree,
            checks: CheckEngine::new(config),
            cooldowns: CooldownEngine::new(config),
            metrics: Arc::new(NoOpMetrics),
        })
    }

    /// Record run counts into `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn tree(&self) -> &CommandTree<C> {
        &self.tree
    }

    fn resolve(&self, id: CommandId) -> GateResult<&Command<C>> {
        self.tree.command(id).ok_or(GateError::UnknownCommand(id))
    }
}

#[async_trait]
impl<C: GateContext> AuthorizationApi<C> for AuthorizationService<C> {
    #[instrument(skip(self, context, provider), fields(command = %command))]
    async fn run_checks(
        &self,
        command: CommandId,
        context: &C,
        provider: Option<&dyn ServiceProvider>,
    ) -> GateResult<AuthResult> {
        let command = self.resolve(command)?;
        let provider = provider.unwrap_or(&EMPTY_PROVIDER);
        let start = Instant::now();

        debug!(name = %command.name(), "Running checks");

        let run = self.checks.run(self.tree(), command, context, provider).await;
        self.metrics.record_check_run(start.elapsed(), run.evaluated);

        match &run.result {
            AuthResult::ChecksFailed(failed) => {
                self.metrics.record_checks_rejected(
                    failed.failures().len(),
                    failed.failures().iter().filter(|f| f.is_fault()).count(),
                );
                warn!(
                    name = %command.name(),
                    failed = failed.failures().len(),
                    faults = failed.has_faults(),
                    reason = %failed.reason(),
                    "Checks failed"
                );
            }
            _ => {
                debug!(
                    name = %command.name(),
                    evaluated = run.evaluated,
                    "Checks passed"
                );
            }
        }

        Ok(run.result)
    }

    #[instrument(skip(self, context, provider), fields(command = %command))]
    async fn run_cooldowns(
        &self,
        command: CommandId,
        context: &C,
        provider: Option<&dyn ServiceProvider>,
    ) -> GateResult<AuthResult> {
        let command = self.resolve(command)?;
        let provider = provider.unwrap_or(&EMPTY_PROVIDER);

        debug!(
            name = %command.name(),
            cooldowns = command.cooldowns().len(),
            "Running cooldowns"
        );

        let hot = self.cooldowns.run(command, context, provider).await?;
        self.metrics.record_cooldown_run(hot.len());

        if hot.is_empty() {
            return Ok(AuthResult::Success);
        }

        let result = CommandOnCooldownResult::new(command.id(), command.name(), hot);
        info!(
            name = %command.name(),
            hot = result.cooldowns().len(),
            reason = %result.reason(),
            "Command on cooldown"
        );
        Ok(AuthResult::OnCooldown(result))
    }
}
