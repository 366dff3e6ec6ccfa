//! Command registration tree
//!
//! Groupings and commands live in an arena owned by `CommandTree`. Parent
//! links are ids into that arena, never owning references.
//!
//! Construction is two-phase:
//!
//! 1. `add_grouping` / `add_command` compose each unit's identity from its
//!    parent's full aliases and attach its policies with their bindings.
//! 2. `build` hands every policy its finished binding exactly once, then
//!    freezes the tree. Nothing is mutated afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::domain::config::GateConfig;
use crate::domain::identity::Identity;
use crate::error::ConfigurationError;
use crate::ports::outbound::{CheckPolicy, CooldownPolicy};

static NEXT_TREE: AtomicU32 = AtomicU32::new(1);

/// Index of a grouping in the tree that issued it
///
/// Ids carry the issuing builder's tag; another tree never resolves them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupingId {
    tree: u32,
    index: usize,
}

impl GroupingId {
    #[cfg(test)]
    pub(crate) fn from_index(index: usize) -> Self {
        Self { tree: 0, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for GroupingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grouping#{}", self.index)
    }
}

/// Index of a command in the tree that issued it
///
/// Ids carry the issuing builder's tag; another tree never resolves them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId {
    tree: u32,
    index: usize,
}

impl CommandId {
    #[cfg(test)]
    pub(crate) fn from_index(index: usize) -> Self {
        Self { tree: 0, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command#{}", self.index)
    }
}

/// Unit a policy is attached to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PolicyOwner {
    Grouping(GroupingId),
    Command(CommandId),
}

impl fmt::Display for PolicyOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyOwner::Grouping(id) => write!(f, "{id}"),
            PolicyOwner::Command(id) => write!(f, "{id}"),
        }
    }
}

/// Back-references of an attached policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyBinding {
    owner: PolicyOwner,
    owner_name: String,
    grouping: Option<GroupingId>,
    command: Option<CommandId>,
}

impl PolicyBinding {
    pub fn owner(&self) -> PolicyOwner {
        self.owner
    }

    /// Display name of the owning unit
    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    /// Grouping the policy belongs to: the owner itself for grouping checks,
    /// the command's parent for command policies.
    pub fn grouping(&self) -> Option<GroupingId> {
        self.grouping
    }

    /// Bound command; `None` for grouping checks.
    pub fn command(&self) -> Option<CommandId> {
        self.command
    }
}

/// A check with its group key and binding
pub struct BoundCheck<C> {
    policy: Arc<dyn CheckPolicy<C>>,
    group: Option<String>,
    binding: PolicyBinding,
}

impl<C> BoundCheck<C> {
    pub fn policy(&self) -> &Arc<dyn CheckPolicy<C>> {
        &self.policy
    }

    pub fn name(&self) -> &str {
        self.policy.name()
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn binding(&self) -> &PolicyBinding {
        &self.binding
    }
}

/// A cooldown with its binding
pub struct BoundCooldown<C> {
    policy: Arc<dyn CooldownPolicy<C>>,
    binding: PolicyBinding,
}

impl<C> BoundCooldown<C> {
    pub fn policy(&self) -> &Arc<dyn CooldownPolicy<C>> {
        &self.policy
    }

    pub fn name(&self) -> &str {
        self.policy.name()
    }

    pub fn binding(&self) -> &PolicyBinding {
        &self.binding
    }
}

/// Ancestor unit: contributes aliases and checks to every descendant.
pub struct Grouping<C> {
    id: GroupingId,
    identity: Identity,
    parent: Option<GroupingId>,
    checks: Vec<BoundCheck<C>>,
}

impl<C> Grouping<C> {
    pub fn id(&self) -> GroupingId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.identity.name()
    }

    pub fn aliases(&self) -> &[String] {
        self.identity.aliases()
    }

    pub fn full_aliases(&self) -> &[String] {
        self.identity.full_aliases()
    }

    pub fn parent(&self) -> Option<GroupingId> {
        self.parent
    }

    pub fn checks(&self) -> &[BoundCheck<C>] {
        &self.checks
    }
}

/// One invocable unit
pub struct Command<C> {
    id: CommandId,
    identity: Identity,
    parent: Option<GroupingId>,
    checks: Vec<BoundCheck<C>>,
    cooldowns: Vec<BoundCooldown<C>>,
}

impl<C> Command<C> {
    pub fn id(&self) -> CommandId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.identity.name()
    }

    pub fn aliases(&self) -> &[String] {
        self.identity.aliases()
    }

    pub fn full_aliases(&self) -> &[String] {
        self.identity.full_aliases()
    }

    pub fn parent(&self) -> Option<GroupingId> {
        self.parent
    }

    pub fn checks(&self) -> &[BoundCheck<C>] {
        &self.checks
    }

    pub fn cooldowns(&self) -> &[BoundCooldown<C>] {
        &self.cooldowns
    }
}

impl<C> fmt::Display for Command<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<C> fmt::Debug for Command<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("full_aliases", &self.full_aliases())
            .field("checks", &self.checks.len())
            .field("cooldowns", &self.cooldowns.len())
            .finish()
    }
}

type CheckDeclaration<C> = (Option<String>, Arc<dyn CheckPolicy<C>>);

/// Declaration of a grouping
pub struct GroupingBuilder<C> {
    name: Option<String>,
    aliases: Vec<String>,
    checks: Vec<CheckDeclaration<C>>,
}

impl<C> Default for GroupingBuilder<C> {
    fn default() -> Self {
        Self {
            name: None,
            aliases: Vec::new(),
            checks: Vec::new(),
        }
    }
}

impl<C> GroupingBuilder<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Add a check; its group comes from `CheckPolicy::group`.
    pub fn check(mut self, policy: impl CheckPolicy<C> + 'static) -> Self {
        self.checks.push((None, Arc::new(policy)));
        self
    }

    /// Add a check under an explicit group key.
    pub fn grouped_check(
        mut self,
        group: impl Into<String>,
        policy: impl CheckPolicy<C> + 'static,
    ) -> Self {
        self.checks.push((Some(group.into()), Arc::new(policy)));
        self
    }

    /// Add a shared check instance.
    pub fn shared_check(mut self, policy: Arc<dyn CheckPolicy<C>>) -> Self {
        self.checks.push((None, policy));
        self
    }
}

/// Declaration of a command
pub struct CommandBuilder<C> {
    name: Option<String>,
    aliases: Vec<String>,
    checks: Vec<CheckDeclaration<C>>,
    cooldowns: Vec<Arc<dyn CooldownPolicy<C>>>,
}

impl<C> Default for CommandBuilder<C> {
    fn default() -> Self {
        Self {
            name: None,
            aliases: Vec::new(),
            checks: Vec::new(),
            cooldowns: Vec::new(),
        }
    }
}

impl<C> CommandBuilder<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Add a check; its group comes from `CheckPolicy::group`.
    pub fn check(mut self, policy: impl CheckPolicy<C> + 'static) -> Self {
        self.checks.push((None, Arc::new(policy)));
        self
    }

    /// Add a check under an explicit group key.
    pub fn grouped_check(
        mut self,
        group: impl Into<String>,
        policy: impl CheckPolicy<C> + 'static,
    ) -> Self {
        self.checks.push((Some(group.into()), Arc::new(policy)));
        self
    }

    /// Add a shared check instance.
    pub fn shared_check(mut self, policy: Arc<dyn CheckPolicy<C>>) -> Self {
        self.checks.push((None, policy));
        self
    }

    pub fn cooldown(mut self, policy: impl CooldownPolicy<C> + 'static) -> Self {
        self.cooldowns.push(Arc::new(policy));
        self
    }

    /// Add a shared cooldown instance.
    pub fn shared_cooldown(mut self, policy: Arc<dyn CooldownPolicy<C>>) -> Self {
        self.cooldowns.push(policy);
        self
    }
}

fn bind_checks<C>(
    declarations: Vec<CheckDeclaration<C>>,
    binding: &PolicyBinding,
) -> Vec<BoundCheck<C>> {
    declarations
        .into_iter()
        .map(|(group, policy)| BoundCheck {
            group: group.or_else(|| policy.group().map(str::to_owned)),
            policy,
            binding: binding.clone(),
        })
        .collect()
}

/// Registers groupings and commands, then freezes them into a `CommandTree`.
pub struct CommandTreeBuilder<C> {
    tag: u32,
    separator: String,
    groupings: Vec<Grouping<C>>,
    commands: Vec<Command<C>>,
}

impl<C> CommandTreeBuilder<C> {
    /// Builder using the configured separator.
    pub fn new(config: &GateConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Self::with_separator(config.separator.clone())
    }

    pub fn with_separator(separator: impl Into<String>) -> Result<Self, ConfigurationError> {
        let separator = separator.into();
        if separator.is_empty() {
            return Err(ConfigurationError::EmptySeparator);
        }
        Ok(Self {
            tag: NEXT_TREE.fetch_add(1, Ordering::Relaxed),
            separator,
            groupings: Vec::new(),
            commands: Vec::new(),
        })
    }

    fn parent_full_aliases(&self, parent: Option<GroupingId>) -> Result<&[String], ConfigurationError> {
        match parent {
            None => Ok(&[][..]),
            Some(id) => self
                .groupings
                .get(id.index)
                .filter(|_| id.tree == self.tag)
                .map(|g| g.full_aliases())
                .ok_or(ConfigurationError::UnknownGrouping(id)),
        }
    }

    /// Register a grouping below `parent` (or at the root).
    pub fn add_grouping(
        &mut self,
        parent: Option<GroupingId>,
        builder: GroupingBuilder<C>,
    ) -> Result<GroupingId, ConfigurationError> {
        let identity = Identity::compose(
            builder.name.as_deref(),
            builder.aliases,
            self.parent_full_aliases(parent)?,
            &self.separator,
        )?;
        let id = GroupingId {
            tree: self.tag,
            index: self.groupings.len(),
        };
        let binding = PolicyBinding {
            owner: PolicyOwner::Grouping(id),
            owner_name: identity.name().to_owned(),
            grouping: Some(id),
            command: None,
        };

        debug!(
            grouping = %identity.name(),
            full_aliases = ?identity.full_aliases(),
            checks = builder.checks.len(),
            "Registered grouping"
        );

        self.groupings.push(Grouping {
            id,
            checks: bind_checks(builder.checks, &binding),
            identity,
            parent,
        });
        Ok(id)
    }

    /// Register a command below `parent` (or at the root).
    pub fn add_command(
        &mut self,
        parent: Option<GroupingId>,
        builder: CommandBuilder<C>,
    ) -> Result<CommandId, ConfigurationError> {
        let identity = Identity::compose(
            builder.name.as_deref(),
            builder.aliases,
            self.parent_full_aliases(parent)?,
            &self.separator,
        )?;
        let id = CommandId {
            tree: self.tag,
            index: self.commands.len(),
        };
        let binding = PolicyBinding {
            owner: PolicyOwner::Command(id),
            owner_name: identity.name().to_owned(),
            grouping: parent,
            command: Some(id),
        };

        debug!(
            command = %identity.name(),
            full_aliases = ?identity.full_aliases(),
            checks = builder.checks.len(),
            cooldowns = builder.cooldowns.len(),
            "Registered command"
        );

        let cooldowns = builder
            .cooldowns
            .into_iter()
            .map(|policy| BoundCooldown {
                policy,
                binding: binding.clone(),
            })
            .collect();

        self.commands.push(Command {
            id,
            checks: bind_checks(builder.checks, &binding),
            cooldowns,
            identity,
            parent,
        });
        Ok(id)
    }

    /// Hand every policy its binding and freeze the tree.
    pub fn build(self) -> Result<CommandTree<C>, ConfigurationError> {
        for grouping in &self.groupings {
            for check in &grouping.checks {
                check.policy.bind(&check.binding)?;
            }
        }

        let mut by_alias = HashMap::new();
        for command in &self.commands {
            for check in &command.checks {
                check.policy.bind(&check.binding)?;
            }
            for cooldown in &command.cooldowns {
                cooldown.policy.bind(&cooldown.binding)?;
            }
            for alias in command.full_aliases() {
                by_alias.entry(alias.clone()).or_insert(command.id);
            }
        }

        debug!(
            groupings = self.groupings.len(),
            commands = self.commands.len(),
            "Command tree frozen"
        );

        Ok(CommandTree {
            tag: self.tag,
            separator: self.separator,
            groupings: self.groupings,
            commands: self.commands,
            by_alias,
        })
    }
}

/// Frozen registration tree
pub struct CommandTree<C> {
    tag: u32,
    separator: String,
    groupings: Vec<Grouping<C>>,
    commands: Vec<Command<C>>,
    by_alias: HashMap<String, CommandId>,
}

impl<C> CommandTree<C> {
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Command for an id issued by this tree.
    pub fn command(&self, id: CommandId) -> Option<&Command<C>> {
        if id.tree != self.tag {
            return None;
        }
        self.commands.get(id.index)
    }

    /// Grouping for an id issued by this tree.
    pub fn grouping(&self, id: GroupingId) -> Option<&Grouping<C>> {
        if id.tree != self.tag {
            return None;
        }
        self.groupings.get(id.index)
    }

    pub fn commands(&self) -> impl Iterator<Item = &Command<C>> {
        self.commands.iter()
    }

    pub fn groupings(&self) -> impl Iterator<Item = &Grouping<C>> {
        self.groupings.iter()
    }

    /// First command registered under a full alias.
    pub fn find_command(&self, full_alias: &str) -> Option<&Command<C>> {
        self.by_alias
            .get(full_alias)
            .and_then(|id| self.command(*id))
    }

    /// Ancestor chain of a command, outermost first.
    pub fn ancestors(&self, command: &Command<C>) -> Vec<&Grouping<C>> {
        let mut chain = Vec::new();
        let mut next = command.parent;
        while let Some(id) = next {
            match self.grouping(id) {
                Some(grouping) => {
                    chain.push(grouping);
                    next = grouping.parent;
                }
                None => break,
            }
        }
        chain.reverse();
        chain
    }
}
