//! Error types for the authorization pipeline

use std::time::Duration;
use thiserror::Error;

use crate::domain::tree::{CommandId, GroupingId};

/// Errors raised while building commands, groupings, policies, or configuration.
///
/// These are programmer errors: they surface synchronously during registration
/// and are never produced while a command is being authorized.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("no explicit name and no aliases to derive one from")]
    MissingName,

    #[error("cooldown retry-after must be greater than zero")]
    NonPositiveRetryAfter,

    #[error("bucket type must render a non-empty label")]
    InvalidBucketType,

    #[error("unknown grouping: {0}")]
    UnknownGrouping(GroupingId),

    #[error("alias separator cannot be empty")]
    EmptySeparator,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("policy '{policy}' rejected binding to '{owner}': {reason}")]
    BindingRejected {
        policy: String,
        owner: String,
        reason: String,
    },
}

/// A policy could not produce an outcome.
///
/// Returned from `evaluate` by check and cooldown policies, or synthesized by
/// the engines when a policy panics or overruns its deadline.
#[derive(Debug, Error)]
pub enum PolicyFault {
    #[error("policy error: {0}")]
    Error(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("policy panicked: {0}")]
    Panicked(String),

    #[error("policy timed out after {0:?}")]
    TimedOut(Duration),

    #[error("policy deadline of {0:?} requires a tokio runtime")]
    NoRuntime(Duration),
}

impl PolicyFault {
    /// Wrap any error type as a fault.
    pub fn from_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Error(Box::new(error))
    }

    /// Fault carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Error(message.into().into())
    }
}

/// Unhandled conditions surfaced by the authorization facade.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("unknown command: {0}")]
    UnknownCommand(CommandId),

    #[error("cooldown policy '{policy}' faulted for command '{command}': {source}")]
    CooldownFault {
        command: String,
        policy: String,
        #[source]
        source: PolicyFault,
    },
}

/// Result alias for facade operations
pub type GateResult<T> = Result<T, GateError>;
