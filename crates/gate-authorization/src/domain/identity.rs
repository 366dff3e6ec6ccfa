//! Identity Composer
//!
//! Derives a unit's display name and its full hierarchical alias set from its
//! own declared aliases and the already-composed full aliases of its parent.
//!
//! Composition is ancestor-major, own-minor:
//!
//! ```text
//! parent full aliases: ["mod", "m"]     own aliases: ["ban", "b"]
//! separator: " "
//!
//! => ["mod ban", "mod b", "m ban", "m b"]
//! ```
//!
//! The first element usually becomes the default display name, so the order is
//! part of the contract.

use crate::error::ConfigurationError;

/// Compose the full alias set of a unit from its parent's full aliases.
///
/// - Empty parent set: own aliases, unchanged.
/// - Empty own set: parent set, unchanged.
/// - Otherwise: every `parent + separator + own` pair, parent as the outer loop.
pub fn compose_full_aliases(
    ancestor_full_aliases: &[String],
    own_aliases: &[String],
    separator: &str,
) -> Vec<String> {
    if ancestor_full_aliases.is_empty() {
        return own_aliases.to_vec();
    }

    if own_aliases.is_empty() {
        return ancestor_full_aliases.to_vec();
    }

    let mut full = Vec::with_capacity(ancestor_full_aliases.len() * own_aliases.len());
    for ancestor in ancestor_full_aliases {
        for own in own_aliases {
            full.push(format!("{ancestor}{separator}{own}"));
        }
    }
    full
}

/// Resolve a display name: the explicit one, else the first full alias.
pub fn resolve_name(
    explicit: Option<&str>,
    full_aliases: &[String],
) -> Result<String, ConfigurationError> {
    explicit
        .map(str::to_owned)
        .or_else(|| full_aliases.first().cloned())
        .ok_or(ConfigurationError::MissingName)
}

/// Immutable naming data of a command or grouping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    name: String,
    aliases: Vec<String>,
    full_aliases: Vec<String>,
}

impl Identity {
    /// Compose an identity below a parent whose full aliases are already known.
    pub fn compose(
        explicit_name: Option<&str>,
        aliases: Vec<String>,
        parent_full_aliases: &[String],
        separator: &str,
    ) -> Result<Self, ConfigurationError> {
        let full_aliases = compose_full_aliases(parent_full_aliases, &aliases, separator);
        let name = resolve_name(explicit_name, &full_aliases)?;
        Ok(Self {
            name,
            aliases,
            full_aliases,
        })
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Own aliases, as declared
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Aliases prefixed by every ancestor path
    pub fn full_aliases(&self) -> &[String] {
        &self.full_aliases
    }
}
