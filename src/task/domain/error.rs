//! Error types for task reference validation and parsing.

use thiserror::Error;

/// Errors returned while constructing task reference values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The project identifier is empty, too long, or malformed.
    #[error("invalid project identifier '{0}'")]
    InvalidProjectId(String),

    /// The task number is invalid.
    #[error("invalid task number {0}, expected a positive integer")]
    InvalidTaskNumber(u64),

    /// The text form does not follow `project/number`.
    #[error("invalid task reference '{0}', expected project/number")]
    InvalidTaskReference(String),
}
