//! Task lifecycle statuses.

use super::ParseTaskStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
///
/// Variants are declared in lifecycle order, which is also their sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Work has not started. Every task begins here.
    ToDo,
    /// Work is under way.
    InProgress,
    /// Work is stalled on something outside the task.
    Blocked,
    /// Work is finished and awaits verification.
    PendingVerification,
    /// Verification passed.
    VerificationComplete,
    /// The task is done.
    Completed,
    /// The task was abandoned.
    Cancelled,
}

impl TaskStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 7] = [
        Self::ToDo,
        Self::InProgress,
        Self::Blocked,
        Self::PendingVerification,
        Self::VerificationComplete,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Status a task holds before its first recorded transition.
    pub const INITIAL: Self = Self::ToDo;

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToDo => "to_do",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::PendingVerification => "pending_verification",
            Self::VerificationComplete => "verification_complete",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns whether no further lifecycle transition is legal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "to_do" => Ok(Self::ToDo),
            "in_progress" => Ok(Self::InProgress),
            "blocked" => Ok(Self::Blocked),
            "pending_verification" => Ok(Self::PendingVerification),
            "verification_complete" => Ok(Self::VerificationComplete),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}
