//! Domain layer: identity composition, the command tree, outcomes and results.

pub mod check;
pub mod config;
pub mod cooldown;
pub mod identity;
pub mod results;
pub mod tree;

pub use check::{failed_partitions, CheckFailure, CheckOutcome};
pub use config::{GateConfig, GateConfigBuilder};
pub use cooldown::{BucketKind, BucketScope, BucketType, CooldownOutcome};
pub use identity::{compose_full_aliases, resolve_name, Identity};
pub use results::{AuthResult, ChecksFailedResult, CommandOnCooldownResult, FailedScope};
pub use tree::{
    BoundCheck, BoundCooldown, Command, CommandBuilder, CommandId, CommandTree,
    CommandTreeBuilder, Grouping, GroupingBuilder, GroupingId, PolicyBinding, PolicyOwner,
};
