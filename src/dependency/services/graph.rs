//! Service layer maintaining the acyclic dependency graph.

use crate::dependency::{
    domain::{CyclePath, DependencyDomainError, DependencyEdge, DependencyIndex, DependencyType},
    ports::{DependencyEdgeRepository, DependencyRepositoryError},
};
use crate::task::{
    domain::TaskIdentity,
    ports::{TaskRefResolver, TaskResolverError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Request payload for adding a dependency edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddDependencyRequest {
    predecessor: TaskIdentity,
    successor: TaskIdentity,
    dependency_type: DependencyType,
    deadline: Option<DateTime<Utc>>,
}

impl AddDependencyRequest {
    /// Creates a request for `predecessor -> successor`.
    #[must_use]
    pub const fn new(
        predecessor: TaskIdentity,
        successor: TaskIdentity,
        dependency_type: DependencyType,
    ) -> Self {
        Self {
            predecessor,
            successor,
            dependency_type,
            deadline: None,
        }
    }

    /// Aborts the request without mutation if not committed by `deadline`.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Service-level errors for dependency graph operations.
#[derive(Debug, Error)]
pub enum DependencyGraphError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] DependencyDomainError),

    /// A referenced task does not exist.
    #[error("unknown task {0}")]
    UnknownTask(TaskIdentity),

    /// An edge between the two tasks already exists.
    #[error("dependency {predecessor} -> {successor} already exists")]
    DuplicateDependency {
        /// Predecessor of the existing edge.
        predecessor: TaskIdentity,
        /// Successor of the existing edge.
        successor: TaskIdentity,
        /// Type of the existing edge, when the in-memory index knows it.
        existing_type: Option<DependencyType>,
    },

    /// The edge would close a cycle.
    #[error("dependency {predecessor} -> {successor} would create a cycle: {cycle}")]
    CircularDependency {
        /// Predecessor of the rejected edge.
        predecessor: TaskIdentity,
        /// Successor of the rejected edge.
        successor: TaskIdentity,
        /// Loop the edge would have closed.
        cycle: CyclePath,
    },

    /// The caller's deadline passed before the edge could be committed.
    #[error("deadline exceeded before the dependency change was committed")]
    DeadlineExceeded,

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] DependencyRepositoryError),

    /// Task resolution failed.
    #[error(transparent)]
    Resolver(#[from] TaskResolverError),
}

/// Result type for dependency graph service operations.
pub type DependencyGraphResult<T> = Result<T, DependencyGraphError>;

/// Dependency graph orchestration service.
///
/// Mutations are serialized by a single writer lock: validation, persistence,
/// and the index commit all happen while it is held, so two concurrent
/// additions can never both pass their cycle check. The index is committed
/// only after storage succeeds and readers never observe an uncommitted edge.
pub struct DependencyGraphService<R, T, C>
where
    R: DependencyEdgeRepository,
    T: TaskRefResolver,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    resolver: Arc<T>,
    clock: Arc<C>,
    index: RwLock<DependencyIndex>,
    writer: Mutex<()>,
}

impl<R, T, C> DependencyGraphService<R, T, C>
where
    R: DependencyEdgeRepository,
    T: TaskRefResolver,
    C: Clock + Send + Sync,
{
    /// Creates a service with an empty index.
    ///
    /// Call [`Self::hydrate`] to load previously persisted edges.
    #[must_use]
    pub fn new(repository: Arc<R>, resolver: Arc<T>, clock: Arc<C>) -> Self {
        Self {
            repository,
            resolver,
            clock,
            index: RwLock::new(DependencyIndex::new()),
            writer: Mutex::new(()),
        }
    }

    /// Replaces the in-memory index with the edges held in storage.
    ///
    /// Returns the number of edges loaded. Persisted cycles are reported with
    /// a warning but still loaded; traversals remain bounded on such data.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyGraphError::Repository`] when loading fails; the
    /// existing index is left untouched in that case.
    pub async fn hydrate(&self) -> DependencyGraphResult<usize> {
        let _writer = self.writer.lock().await;
        let edges = self.repository.load_edges().await?;
        let loaded = DependencyIndex::from_edges(edges);
        let count = loaded.len();
        if !loaded.is_acyclic() {
            warn!(edges = count, "persisted dependency graph contains a cycle");
        }
        *self.index.write().await = loaded;
        debug!(edges = count, "dependency index hydrated");
        Ok(count)
    }

    /// Adds a dependency edge after validating it against the graph.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyGraphError::Domain`] for self-dependencies (checked
    /// before any lookup), [`DependencyGraphError::UnknownTask`],
    /// [`DependencyGraphError::DuplicateDependency`],
    /// [`DependencyGraphError::CircularDependency`],
    /// [`DependencyGraphError::DeadlineExceeded`], or infrastructure errors.
    pub async fn add_dependency(
        &self,
        request: AddDependencyRequest,
    ) -> DependencyGraphResult<DependencyEdge> {
        let AddDependencyRequest {
            predecessor,
            successor,
            dependency_type,
            deadline,
        } = request;
        let edge = DependencyEdge::new(predecessor, successor, dependency_type, &*self.clock)?;
        self.ensure_exists(edge.predecessor()).await?;
        self.ensure_exists(edge.successor()).await?;

        let _writer = self.writer.lock().await;
        self.validate_insert(&edge).await?;
        self.ensure_before(deadline)?;

        self.repository
            .save_edge(&edge)
            .await
            .map_err(|err| match err {
                DependencyRepositoryError::DuplicateEdge { .. } => {
                    DependencyGraphError::DuplicateDependency {
                        predecessor: edge.predecessor().clone(),
                        successor: edge.successor().clone(),
                        existing_type: None,
                    }
                }
                failure @ DependencyRepositoryError::Persistence(_) => {
                    DependencyGraphError::Repository(failure)
                }
            })?;
        self.index.write().await.insert(edge.clone());

        info!(
            predecessor = %edge.predecessor(),
            successor = %edge.successor(),
            dependency_type = %edge.dependency_type(),
            "dependency added"
        );
        Ok(edge)
    }

    /// Removes the edge between two tasks.
    ///
    /// Returns whether an edge was removed; a missing edge is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyGraphError::Repository`] when storage fails; the
    /// index is left unchanged in that case.
    pub async fn remove_dependency(
        &self,
        predecessor: &TaskIdentity,
        successor: &TaskIdentity,
    ) -> DependencyGraphResult<bool> {
        let _writer = self.writer.lock().await;
        let deleted = self.repository.delete_edge(predecessor, successor).await?;
        let evicted = self
            .index
            .write()
            .await
            .remove(predecessor, successor)
            .is_some();

        let removed = deleted || evicted;
        if removed {
            info!(%predecessor, %successor, "dependency removed");
        }
        Ok(removed)
    }

    /// Direct predecessors of `task`.
    pub async fn predecessors_of(&self, task: &TaskIdentity) -> BTreeSet<TaskIdentity> {
        self.index.read().await.predecessors_of(task)
    }

    /// Direct successors of `task`.
    pub async fn successors_of(&self, task: &TaskIdentity) -> BTreeSet<TaskIdentity> {
        self.index.read().await.successors_of(task)
    }

    /// Edges pointing into `task`, with their types.
    pub async fn dependencies_of(&self, task: &TaskIdentity) -> Vec<DependencyEdge> {
        self.index.read().await.incoming_edges(task)
    }

    /// Returns whether `to` is reachable from `from`.
    pub async fn is_reachable(&self, from: &TaskIdentity, to: &TaskIdentity) -> bool {
        self.index.read().await.is_reachable(from, to)
    }

    /// Snapshot of every edge, ordered by creation time.
    pub async fn edges(&self) -> Vec<DependencyEdge> {
        let mut edges: Vec<DependencyEdge> = self.index.read().await.edges().cloned().collect();
        edges.sort_by(|left, right| {
            left.created_at()
                .cmp(&right.created_at())
                .then_with(|| left.predecessor().cmp(right.predecessor()))
                .then_with(|| left.successor().cmp(right.successor()))
        });
        edges
    }

    async fn ensure_exists(&self, task: &TaskIdentity) -> DependencyGraphResult<()> {
        if self.resolver.exists(task).await? {
            Ok(())
        } else {
            Err(DependencyGraphError::UnknownTask(task.clone()))
        }
    }

    async fn validate_insert(&self, edge: &DependencyEdge) -> DependencyGraphResult<()> {
        let index = self.index.read().await;
        if let Some(existing) = index.edge(edge.predecessor(), edge.successor()) {
            debug!(%edge, "duplicate dependency rejected");
            return Err(DependencyGraphError::DuplicateDependency {
                predecessor: edge.predecessor().clone(),
                successor: edge.successor().clone(),
                existing_type: Some(existing.dependency_type().clone()),
            });
        }
        if let Some(cycle) = index.cycle_closed_by(edge.predecessor(), edge.successor()) {
            debug!(%edge, %cycle, "circular dependency rejected");
            return Err(DependencyGraphError::CircularDependency {
                predecessor: edge.predecessor().clone(),
                successor: edge.successor().clone(),
                cycle,
            });
        }
        Ok(())
    }

    fn ensure_before(&self, deadline: Option<DateTime<Utc>>) -> DependencyGraphResult<()> {
        match deadline {
            Some(limit) if self.clock.utc() > limit => Err(DependencyGraphError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}
