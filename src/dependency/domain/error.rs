//! Error types for dependency domain validation.

use crate::task::domain::TaskIdentity;
use thiserror::Error;

/// Errors returned while constructing dependency values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DependencyDomainError {
    /// The dependency type tag is empty, too long, or malformed.
    #[error(
        "invalid dependency type '{0}' (only lowercase alphanumeric and underscores allowed, at most 50 characters)"
    )]
    InvalidDependencyType(String),

    /// A task cannot depend on itself.
    #[error("task {0} cannot depend on itself")]
    SelfDependency(TaskIdentity),
}
