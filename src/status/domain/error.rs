//! Error types for status domain validation and parsing.

use super::{TaskStatus, TransitionRecordId};
use crate::task::domain::TaskIdentity;
use thiserror::Error;

/// Errors returned while validating status changes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StatusDomainError {
    /// The transition table does not allow moving between the two statuses.
    #[error("task {task} cannot move from {from} to {to}")]
    IllegalTransition {
        /// Task the transition was requested for.
        task: TaskIdentity,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// The task already reached a terminal status.
    #[error("task {task} is in terminal status {status}")]
    TerminalState {
        /// Task the transition was requested for.
        task: TaskIdentity,
        /// Terminal status the task is in.
        status: TaskStatus,
    },

    /// The actor identifier is empty after trimming.
    #[error("actor must not be empty")]
    EmptyActor,

    /// The actor identifier exceeds the stored column width.
    #[error("actor must be at most {max} characters, got {length}")]
    ActorTooLong {
        /// Character count of the trimmed value.
        length: usize,
        /// Largest accepted character count.
        max: usize,
    },

    /// The record does not await approval.
    #[error("transition {0} is not awaiting approval")]
    NotPendingApproval(TransitionRecordId),

    /// A transition table tried to leave a terminal status.
    #[error("terminal status {from} cannot have an outbound transition to {to}")]
    TerminalOutbound {
        /// Terminal source status.
        from: TaskStatus,
        /// Target status of the rejected entry.
        to: TaskStatus,
    },
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing transition trigger kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown transition trigger kind: {0}")]
pub struct ParseTriggerKindError(pub String);
