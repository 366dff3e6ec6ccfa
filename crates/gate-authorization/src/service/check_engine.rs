//! Check Evaluation Engine
//!
//! Ancestor groupings are evaluated outermost first and act as hard gates: the
//! first failing grouping ends the run before anything below it is evaluated.
//! Within one scope every check runs concurrently and the results are reduced
//! with group semantics (see `domain::check`).

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::domain::check::{failed_partitions, CheckFailure, CheckOutcome};
use crate::domain::config::GateConfig;
use crate::domain::results::{AuthResult, ChecksFailedResult, FailedScope};
use crate::domain::tree::{BoundCheck, Command, CommandTree};
use crate::error::PolicyFault;
use crate::ports::outbound::{GateContext, PolicyInvocation, ServiceProvider};
use crate::service::guard::Guard;

/// Outcome of one `run_checks` pass
#[derive(Debug)]
pub struct CheckRun {
    pub result: AuthResult,
    /// Checks actually evaluated, ancestors included
    pub evaluated: usize,
}

struct Evaluated<'a, C> {
    check: &'a BoundCheck<C>,
    result: Result<CheckOutcome, PolicyFault>,
}

impl<C> Evaluated<'_, C> {
    fn is_failed(&self) -> bool {
        !matches!(self.result, Ok(CheckOutcome::Success))
    }

    fn into_failure(self) -> CheckFailure {
        let (reason, fault) = match self.result {
            Ok(CheckOutcome::Failure { reason }) => (reason, None),
            Ok(CheckOutcome::Success) => (String::new(), None),
            Err(fault) => (fault.to_string(), Some(Arc::new(fault))),
        };
        CheckFailure {
            check: self.check.name().to_owned(),
            group: self.check.group().map(str::to_owned),
            owner: self.check.binding().owner(),
            reason,
            fault,
        }
    }
}

/// Evaluates check scopes with group semantics.
#[derive(Clone, Copy, Debug)]
pub struct CheckEngine {
    guard: Guard,
}

impl CheckEngine {
    pub fn new(config: &GateConfig) -> Self {
        Self {
            guard: Guard {
                timeout: config.check_timeout,
                catch_panics: config.catch_panics,
            },
        }
    }

    /// Evaluate one scope concurrently and reduce it.
    ///
    /// Returns the members of failing partitions; empty means the scope passed.
    pub async fn evaluate_scope<C: GateContext>(
        &self,
        checks: &[BoundCheck<C>],
        command: &Command<C>,
        context: &C,
        provider: &dyn ServiceProvider,
    ) -> Vec<CheckFailure> {
        if checks.is_empty() {
            return Vec::new();
        }

        let guard = self.guard;
        let evaluations = checks.iter().map(|check| async move {
            let invocation = PolicyInvocation {
                context,
                provider,
                command,
                binding: check.binding(),
            };
            let result = guard.run(check.policy().evaluate(&invocation)).await;
            Evaluated { check, result }
        });
        let evaluated = join_all(evaluations).await;

        for eval in &evaluated {
            if let Err(fault) = &eval.result {
                warn!(
                    command = %command.name(),
                    check = %eval.check.name(),
                    owner = %eval.check.binding().owner_name(),
                    error = %fault,
                    "Check policy faulted"
                );
            }
        }

        failed_partitions(evaluated, |e| e.check.group(), Evaluated::is_failed)
            .into_iter()
            .map(Evaluated::into_failure)
            .collect()
    }

    /// Evaluate the ancestor chain, then the command's own checks.
    pub async fn run<C: GateContext>(
        &self,
        tree: &CommandTree<C>,
        command: &Command<C>,
        context: &C,
        provider: &dyn ServiceProvider,
    ) -> CheckRun {
        let mut evaluated = 0;

        for grouping in tree.ancestors(command) {
            evaluated += grouping.checks().len();
            let failures = self
                .evaluate_scope(grouping.checks(), command, context, provider)
                .await;
            if !failures.is_empty() {
                debug!(
                    command = %command.name(),
                    grouping = %grouping.name(),
                    failed = failures.len(),
                    "Ancestor checks failed, skipping remaining scopes"
                );
                let scope = FailedScope::Grouping {
                    id: grouping.id(),
                    name: grouping.name().to_owned(),
                };
                return CheckRun {
                    result: AuthResult::ChecksFailed(ChecksFailedResult::new(
                        command.id(),
                        command.name(),
                        scope,
                        failures,
                    )),
                    evaluated,
                };
            }
        }

        evaluated += command.checks().len();
        let failures = self
            .evaluate_scope(command.checks(), command, context, provider)
            .await;

        let result = if failures.is_empty() {
            AuthResult::Success
        } else {
            AuthResult::ChecksFailed(ChecksFailedResult::new(
                command.id(),
                command.name(),
                FailedScope::Command,
                failures,
            ))
        };

        CheckRun { result, evaluated }
    }
}
