//! Check outcomes and group reduction
//!
//! Checks attached to one scope (a grouping or a command) are partitioned by
//! their group key, in order of first appearance:
//!
//! - the ungrouped partition fails if ANY member failed (every member is a gate)
//! - a named partition fails only if ALL members failed (any member satisfies it)
//!
//! The scope fails if at least one partition fails. The failure carries every
//! failed member of the failing partitions, partition order first, member
//! order second.

use std::sync::Arc;

use crate::domain::tree::PolicyOwner;
use crate::error::PolicyFault;

/// Result of a single check evaluation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckOutcome {
    Success,
    Failure { reason: String },
}

impl CheckOutcome {
    pub fn success() -> Self {
        Self::Success
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Failure reason, if failed.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::Failure { reason } => Some(reason),
        }
    }
}

impl From<bool> for CheckOutcome {
    fn from(passed: bool) -> Self {
        if passed {
            Self::Success
        } else {
            Self::failure("check did not pass")
        }
    }
}

/// One failed check inside a `ChecksFailedResult`.
#[derive(Clone, Debug)]
pub struct CheckFailure {
    pub(crate) check: String,
    pub(crate) group: Option<String>,
    pub(crate) owner: PolicyOwner,
    pub(crate) reason: String,
    pub(crate) fault: Option<Arc<PolicyFault>>,
}

impl CheckFailure {
    /// Name of the failing check
    pub fn check(&self) -> &str {
        &self.check
    }

    /// Group key of the failing check
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Grouping or command the check is attached to
    pub fn owner(&self) -> PolicyOwner {
        self.owner
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Fault raised by the policy, when it could not produce an outcome.
    pub fn fault(&self) -> Option<&PolicyFault> {
        self.fault.as_deref()
    }

    pub fn is_fault(&self) -> bool {
        self.fault.is_some()
    }
}

/// Reduce evaluated checks to the members of failing partitions.
///
/// Returns an empty vector when every partition is satisfied.
pub fn failed_partitions<T>(
    results: Vec<T>,
    group_of: impl Fn(&T) -> Option<&str>,
    is_failed: impl Fn(&T) -> bool,
) -> Vec<T> {
    // Partition indices by group key, preserving first-appearance order.
    let mut partitions: Vec<(Option<String>, Vec<usize>)> = Vec::new();
    for (index, result) in results.iter().enumerate() {
        let key = group_of(result);
        match partitions
            .iter_mut()
            .find(|(existing, _)| existing.as_deref() == key)
        {
            Some((_, members)) => members.push(index),
            None => partitions.push((key.map(str::to_owned), vec![index])),
        }
    }

    let mut keep = vec![false; results.len()];
    for (key, members) in &partitions {
        let partition_failed = match key {
            None => members.iter().any(|&i| is_failed(&results[i])),
            Some(_) => members.iter().all(|&i| is_failed(&results[i])),
        };
        if partition_failed {
            for &i in members {
                keep[i] = is_failed(&results[i]);
            }
        }
    }

    // Emit in partition order, then member order.
    let order: Vec<usize> = partitions
        .into_iter()
        .flat_map(|(_, members)| members)
        .filter(|&i| keep[i])
        .collect();

    let mut slots: Vec<Option<T>> = results.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect()
}
