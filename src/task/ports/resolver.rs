//! Resolver port confirming that referenced tasks exist.

use crate::task::domain::TaskIdentity;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task resolver operations.
pub type TaskResolverResult<T> = Result<T, TaskResolverError>;

/// Lookup contract backed by the surrounding task store.
#[async_trait]
pub trait TaskRefResolver: Send + Sync {
    /// Returns whether a task with the given identity exists.
    ///
    /// # Errors
    ///
    /// Returns [`TaskResolverError::Unavailable`] when the backing store
    /// cannot be queried.
    async fn exists(&self, task: &TaskIdentity) -> TaskResolverResult<bool>;
}

/// Errors returned by task resolver implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskResolverError {
    /// The backing task store could not be reached.
    #[error("task store unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskResolverError {
    /// Wraps a backing-store error.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
