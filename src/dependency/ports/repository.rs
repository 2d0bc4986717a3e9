//! Repository port for dependency edge persistence.

use crate::dependency::domain::DependencyEdge;
use crate::task::domain::TaskIdentity;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for dependency repository operations.
pub type DependencyRepositoryResult<T> = Result<T, DependencyRepositoryError>;

/// Dependency edge persistence contract.
#[async_trait]
pub trait DependencyEdgeRepository: Send + Sync {
    /// Stores a new edge.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyRepositoryError::DuplicateEdge`] when an edge
    /// between the same two tasks already exists.
    async fn save_edge(&self, edge: &DependencyEdge) -> DependencyRepositoryResult<()>;

    /// Deletes the edge between two tasks.
    ///
    /// Returns `true` when an edge was removed and `false` when none existed.
    async fn delete_edge(
        &self,
        predecessor: &TaskIdentity,
        successor: &TaskIdentity,
    ) -> DependencyRepositoryResult<bool>;

    /// Loads every stored edge, oldest first.
    async fn load_edges(&self) -> DependencyRepositoryResult<Vec<DependencyEdge>>;
}

/// Errors returned by dependency repository implementations.
#[derive(Debug, Clone, Error)]
pub enum DependencyRepositoryError {
    /// An edge between the two tasks already exists.
    #[error("duplicate dependency edge: {predecessor} -> {successor}")]
    DuplicateEdge {
        /// Predecessor of the conflicting edge.
        predecessor: TaskIdentity,
        /// Successor of the conflicting edge.
        successor: TaskIdentity,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl DependencyRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
