//! Data-driven lifecycle transition table.

use super::{StatusDomainError, TaskStatus};
use crate::task::domain::TaskIdentity;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

type Transitions = BTreeMap<TaskStatus, BTreeSet<TaskStatus>>;

/// Allowed lifecycle moves, keyed by source status.
///
/// A terminal status never has outbound entries; construction and
/// deserialization both reject such tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Transitions", into = "Transitions")]
pub struct TransitionTable {
    transitions: Transitions,
}

impl TransitionTable {
    /// Creates a table that permits nothing.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            transitions: BTreeMap::new(),
        }
    }

    /// Returns a copy of the table that also permits `from -> to`.
    ///
    /// # Errors
    ///
    /// Returns [`StatusDomainError::TerminalOutbound`] when `from` is terminal.
    pub fn with_transition(
        mut self,
        from: TaskStatus,
        to: TaskStatus,
    ) -> Result<Self, StatusDomainError> {
        if from.is_terminal() {
            return Err(StatusDomainError::TerminalOutbound { from, to });
        }
        self.transitions.entry(from).or_default().insert(to);
        Ok(self)
    }

    /// Returns whether the table permits `from -> to`.
    #[must_use]
    pub fn permits(&self, from: TaskStatus, to: TaskStatus) -> bool {
        self.transitions
            .get(&from)
            .is_some_and(|targets| targets.contains(&to))
    }

    /// Statuses reachable from `from` in one move.
    #[must_use]
    pub fn allowed_from(&self, from: TaskStatus) -> BTreeSet<TaskStatus> {
        self.transitions.get(&from).cloned().unwrap_or_default()
    }

    /// Validates a requested move for `task`.
    ///
    /// # Errors
    ///
    /// Returns [`StatusDomainError::TerminalState`] when `from` is terminal
    /// and [`StatusDomainError::IllegalTransition`] when the table has no
    /// `from -> to` entry.
    pub fn check(
        &self,
        task: &TaskIdentity,
        from: TaskStatus,
        to: TaskStatus,
    ) -> Result<(), StatusDomainError> {
        if from.is_terminal() {
            return Err(StatusDomainError::TerminalState {
                task: task.clone(),
                status: from,
            });
        }
        if !self.permits(from, to) {
            return Err(StatusDomainError::IllegalTransition {
                task: task.clone(),
                from,
                to,
            });
        }
        Ok(())
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        use TaskStatus::{
            Blocked, Cancelled, Completed, InProgress, PendingVerification, ToDo,
            VerificationComplete,
        };

        let entries: [(TaskStatus, &[TaskStatus]); 5] = [
            (ToDo, &[InProgress, Cancelled]),
            (InProgress, &[Blocked, PendingVerification, Cancelled]),
            (Blocked, &[InProgress, Cancelled]),
            (
                PendingVerification,
                &[VerificationComplete, InProgress, Cancelled],
            ),
            (VerificationComplete, &[Completed, InProgress]),
        ];

        let transitions: Transitions = entries
            .into_iter()
            .map(|(from, targets)| (from, targets.iter().copied().collect::<BTreeSet<_>>()))
            .collect();
        Self { transitions }
    }
}

impl TryFrom<Transitions> for TransitionTable {
    type Error = StatusDomainError;

    fn try_from(value: Transitions) -> Result<Self, Self::Error> {
        value
            .into_iter()
            .flat_map(|(from, targets)| targets.into_iter().map(move |to| (from, to)))
            .try_fold(Self::empty(), |table, (from, to)| {
                table.with_transition(from, to)
            })
    }
}

impl From<TransitionTable> for Transitions {
    fn from(value: TransitionTable) -> Self {
        value.transitions
    }
}
