//! Authorization results
//!
//! Both facade entry points return an `AuthResult`. Failure payloads carry the
//! command's identity and a rendered, human-readable reason.

use std::fmt;

use crate::domain::check::CheckFailure;
use crate::domain::cooldown::CooldownOutcome;
use crate::domain::tree::{CommandId, GroupingId};

/// Scope whose checks failed
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailedScope {
    /// An ancestor grouping short-circuited evaluation.
    Grouping { id: GroupingId, name: String },
    /// The command's own checks failed.
    Command,
}

/// Outcome of `run_checks` or `run_cooldowns`
#[derive(Clone, Debug)]
pub enum AuthResult {
    Success,
    ChecksFailed(ChecksFailedResult),
    OnCooldown(CommandOnCooldownResult),
}

impl AuthResult {
    pub fn is_successful(&self) -> bool {
        matches!(self, AuthResult::Success)
    }

    /// Human-readable rejection message; `None` on success.
    pub fn reason(&self) -> Option<&str> {
        match self {
            AuthResult::Success => None,
            AuthResult::ChecksFailed(failed) => Some(failed.reason()),
            AuthResult::OnCooldown(cooldown) => Some(cooldown.reason()),
        }
    }

    pub fn checks_failed(&self) -> Option<&ChecksFailedResult> {
        match self {
            AuthResult::ChecksFailed(failed) => Some(failed),
            _ => None,
        }
    }

    pub fn on_cooldown(&self) -> Option<&CommandOnCooldownResult> {
        match self {
            AuthResult::OnCooldown(cooldown) => Some(cooldown),
            _ => None,
        }
    }
}

impl fmt::Display for AuthResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason() {
            Some(reason) => f.write_str(reason),
            None => f.write_str("success"),
        }
    }
}

/// One or more mandatory checks, or every member of a named group, failed.
#[derive(Clone, Debug)]
pub struct ChecksFailedResult {
    command: CommandId,
    command_name: String,
    scope: FailedScope,
    failures: Vec<CheckFailure>,
    reason: String,
}

impl ChecksFailedResult {
    pub(crate) fn new(
        command: CommandId,
        command_name: &str,
        scope: FailedScope,
        failures: Vec<CheckFailure>,
    ) -> Self {
        let reason = render_checks_reason(command_name, &scope, &failures);
        Self {
            command,
            command_name: command_name.to_owned(),
            scope,
            failures,
            reason,
        }
    }

    pub fn command(&self) -> CommandId {
        self.command
    }

    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    /// Where evaluation stopped
    pub fn scope(&self) -> &FailedScope {
        &self.scope
    }

    /// Failed checks, partition order then member order.
    pub fn failures(&self) -> &[CheckFailure] {
        &self.failures
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// True when at least one failure came from a faulting policy.
    pub fn has_faults(&self) -> bool {
        self.failures.iter().any(CheckFailure::is_fault)
    }
}

fn render_checks_reason(command: &str, scope: &FailedScope, failures: &[CheckFailure]) -> String {
    let count = match failures.len() {
        1 => "One check".to_string(),
        n => format!("{n} checks"),
    };
    let target = match scope {
        FailedScope::Command => format!("the command '{command}'"),
        FailedScope::Grouping { name, .. } => {
            format!("the grouping '{name}' of command '{command}'")
        }
    };
    let reasons = failures
        .iter()
        .map(|failure| format!("'{}': {}", failure.check(), failure.reason()))
        .collect::<Vec<_>>()
        .join("; ");

    format!("{count} failed for {target}. {reasons}")
}

/// One or more cooldown buckets are hot.
#[derive(Clone, Debug)]
pub struct CommandOnCooldownResult {
    command: CommandId,
    command_name: String,
    cooldowns: Vec<CooldownOutcome>,
    reason: String,
}

impl CommandOnCooldownResult {
    pub(crate) fn new(command: CommandId, command_name: &str, cooldowns: Vec<CooldownOutcome>) -> Self {
        let reason = render_cooldown_reason(command_name, &cooldowns);
        Self {
            command,
            command_name: command_name.to_owned(),
            cooldowns,
            reason,
        }
    }

    pub fn command(&self) -> CommandId {
        self.command
    }

    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    /// Hot buckets in declaration order
    pub fn cooldowns(&self) -> &[CooldownOutcome] {
        &self.cooldowns
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

fn bucket_label(outcome: &CooldownOutcome) -> &str {
    outcome.bucket_type().map(|b| b.label()).unwrap_or("unknown")
}

fn render_cooldown_reason(command: &str, cooldowns: &[CooldownOutcome]) -> String {
    match cooldowns {
        [single] => format!(
            "Command '{command}' is on a '{}' cooldown. Retry after {:?}.",
            bucket_label(single),
            single.retry_after()
        ),
        many => format!(
            "Command '{command}' is on multiple cooldowns: {}",
            many.iter()
                .map(|c| format!("'{}' - retry after {:?}", bucket_label(c), c.retry_after()))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}
