//! Facade-level error type and classification.

use crate::dependency::services::DependencyGraphError;
use crate::status::{ports::TransitionRepositoryError, services::StatusTransitionError};
use thiserror::Error;

/// Broad category of a failure, for callers deciding how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request itself was wrong; retrying it unchanged will fail again.
    Input,
    /// The request conflicts with the graph or a concurrent writer.
    Consistency,
    /// Storage, resolution, or timing failed; the caller may retry.
    Infrastructure,
}

/// Errors returned by [`crate::tracker::DependencyStatusFacade`].
#[derive(Debug, Error)]
pub enum TrackerError {
    /// A dependency graph operation failed.
    #[error(transparent)]
    Dependency(#[from] DependencyGraphError),

    /// A status operation failed.
    #[error(transparent)]
    Status(#[from] StatusTransitionError),
}

/// Result type for facade operations.
pub type TrackerResult<T> = Result<T, TrackerError>;

impl TrackerError {
    /// Classifies the failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Dependency(err) => match err {
                DependencyGraphError::Domain(_)
                | DependencyGraphError::UnknownTask(_)
                | DependencyGraphError::DuplicateDependency { .. } => ErrorKind::Input,
                DependencyGraphError::CircularDependency { .. } => ErrorKind::Consistency,
                DependencyGraphError::DeadlineExceeded
                | DependencyGraphError::Repository(_)
                | DependencyGraphError::Resolver(_) => ErrorKind::Infrastructure,
            },
            Self::Status(err) => match err {
                StatusTransitionError::Domain(_)
                | StatusTransitionError::UnknownTask(_)
                | StatusTransitionError::ApprovalAlreadyPending { .. }
                | StatusTransitionError::TransitionNotFound(_) => ErrorKind::Input,
                StatusTransitionError::Repository(
                    TransitionRepositoryError::ChainConflict { .. }
                    | TransitionRepositoryError::ApprovalPending { .. }
                    | TransitionRepositoryError::DuplicateRecord(_),
                ) => ErrorKind::Consistency,
                StatusTransitionError::DeadlineExceeded
                | StatusTransitionError::Repository(_)
                | StatusTransitionError::Resolver(_) => ErrorKind::Infrastructure,
            },
        }
    }

    /// Returns whether retrying the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Infrastructure)
    }
}
