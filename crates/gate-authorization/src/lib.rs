//! # Gate Authorization
//!
//! Authorization pipeline for a command dispatcher: decides whether a resolved
//! command may run right now for a given invocation context.
//!
//! Two independent gates compose the decision:
//!
//! - **Checks**: boolean preconditions on the command and on every ancestor
//!   grouping, reduced with group semantics.
//! - **Cooldowns**: rate-limit buckets, each reporting how long until it
//!   cools down.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure logic, no I/O
//!   - `Identity`: name and full-alias composition across the ancestor chain
//!   - `CommandTree`: arena of groupings and commands, built in two phases
//!   - `CheckOutcome`, `CooldownOutcome`, `BucketType`
//!   - `AuthResult`: uniform result of both gates
//!   - `GateConfig`: configuration with validation
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `AuthorizationApi`: Driving port (`run_checks`, `run_cooldowns`)
//!   - `CheckPolicy`, `CooldownPolicy`, `ServiceProvider`: Driven ports
//!
//! - **Service Layer** (`service/`): Orchestration
//!   - `CheckEngine`: ancestor short-circuit, concurrent fan-out, group reduction
//!   - `CooldownEngine`: sequential bucket evaluation
//!   - `AuthorizationService`: Implements `AuthorizationApi`
//!
//! - **Adapters Layer** (`adapters/`): Built-in policies
//!   - `FnCheck`: closure-backed check
//!   - `RateLimitCooldown`: governor token bucket per key
//!   - `ServiceMap`, `EmptyServiceProvider`
//!
//! ## Group semantics
//!
//! Checks in one scope are partitioned by group key. Ungrouped checks are
//! each mandatory (AND). A named group is satisfied when any member passes
//! (OR). The scope fails if any partition fails.
//!
//! ```text
//! command "mod ban"
//!   grouping "mod":   [guild-only]                 <- evaluated first, hard gate
//!   own checks:       [owner @staff, admin @staff, not-self]
//!                      \_____ staff: OR _______/    \_ AND _/
//! ```
//!
//! ## Usage Example
//!
//! ```ignore
//! use gate_authorization::*;
//! use std::sync::Arc;
//!
//! let config = GateConfig::default();
//! let mut tree = CommandTreeBuilder::new(&config)?;
//!
//! let moderation = tree.add_grouping(
//!     None,
//!     GroupingBuilder::new()
//!         .alias("mod")
//!         .check(FnCheck::new("guild-only", |inv| inv.context.guild.is_some().into())),
//! )?;
//!
//! let ban = tree.add_command(
//!     Some(moderation),
//!     CommandBuilder::new()
//!         .alias("ban")
//!         .check(FnCheck::new("owner", is_owner).in_group("staff"))
//!         .check(FnCheck::new("admin", is_admin).in_group("staff"))
//!         .cooldown(RateLimitCooldown::new(1, Duration::from_secs(10), BucketScope::User, |ctx| {
//!             Some(ctx.user.to_string())
//!         })?),
//! )?;
//!
//! let service = AuthorizationService::new(Arc::new(tree.build()?), &config)?;
//!
//! let checks = service.run_checks(ban, &ctx, None).await?;
//! if checks.is_successful() {
//!     let cooldowns = service.run_cooldowns(ban, &ctx, None).await?;
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use adapters::{cleanup_task, EmptyServiceProvider, FnCheck, RateLimitCooldown, ServiceMap};
pub use domain::{
    compose_full_aliases, AuthResult, BucketKind, BucketScope, BucketType, CheckFailure,
    CheckOutcome, ChecksFailedResult, Command, CommandBuilder, CommandId,
    CommandOnCooldownResult, CommandTree, CommandTreeBuilder, CooldownOutcome, FailedScope,
    GateConfig, GateConfigBuilder, Grouping, GroupingBuilder, GroupingId, PolicyBinding,
    PolicyOwner,
};
pub use error::{ConfigurationError, GateError, GateResult, PolicyFault};
pub use metrics::{Metrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics};
pub use ports::{
    AuthorizationApi, CheckPolicy, CooldownPolicy, GateContext, PolicyInvocation,
    ServiceProvider,
};
pub use service::{AuthorizationService, CheckEngine, CooldownEngine};
