//! Approval requirements for status changes.

use super::TaskStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Target statuses whose entry must be approved before it takes effect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApprovalPolicy {
    #[serde(default)]
    required_for: BTreeSet<TaskStatus>,
}

impl ApprovalPolicy {
    /// A policy requiring no approvals.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            required_for: BTreeSet::new(),
        }
    }

    /// A policy requiring approval to enter each of `statuses`.
    #[must_use]
    pub fn requiring(statuses: impl IntoIterator<Item = TaskStatus>) -> Self {
        Self {
            required_for: statuses.into_iter().collect(),
        }
    }

    /// Returns whether entering `status` needs approval.
    #[must_use]
    pub fn requires_approval(&self, status: TaskStatus) -> bool {
        self.required_for.contains(&status)
    }

    /// Statuses gated by this policy.
    #[must_use]
    pub const fn required_for(&self) -> &BTreeSet<TaskStatus> {
        &self.required_for
    }
}
