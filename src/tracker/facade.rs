//! Facade over the dependency graph and the status engine.

use super::{TrackerConfig, TrackerResult};
use crate::dependency::{
    domain::DependencyEdge,
    ports::DependencyEdgeRepository,
    services::{AddDependencyRequest, DependencyGraphService},
};
use crate::status::{
    domain::{Actor, TaskStatus, TransitionRecord, TransitionRecordId},
    ports::TransitionRepository,
    services::{StatusTransitionService, TransitionRequest},
};
use crate::task::{domain::TaskIdentity, ports::TaskRefResolver};
use mockable::Clock;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Single entry point for dependency and status operations.
///
/// The facade owns one [`DependencyGraphService`] and one
/// [`StatusTransitionService`] sharing the same resolver and clock.
pub struct DependencyStatusFacade<D, S, T, C>
where
    D: DependencyEdgeRepository,
    S: TransitionRepository,
    T: TaskRefResolver,
    C: Clock + Send + Sync,
{
    graph: DependencyGraphService<D, T, C>,
    status: StatusTransitionService<S, T, C>,
}

impl<D, S, T, C> DependencyStatusFacade<D, S, T, C>
where
    D: DependencyEdgeRepository,
    S: TransitionRepository,
    T: TaskRefResolver,
    C: Clock + Send + Sync,
{
    /// Wires both services without loading stored edges.
    #[must_use]
    pub fn new(
        edges: Arc<D>,
        history: Arc<S>,
        resolver: Arc<T>,
        clock: Arc<C>,
        config: TrackerConfig,
    ) -> Self {
        let TrackerConfig {
            transition_table,
            approval,
        } = config;
        let graph = DependencyGraphService::new(edges, Arc::clone(&resolver), Arc::clone(&clock));
        let status = StatusTransitionService::new(history, resolver, clock)
            .with_table(transition_table)
            .with_policy(approval);
        Self { graph, status }
    }

    /// Wires both services and loads stored edges into the graph index.
    ///
    /// # Errors
    ///
    /// Returns [`super::TrackerError::Dependency`] when the edges cannot be
    /// loaded.
    pub async fn start(
        edges: Arc<D>,
        history: Arc<S>,
        resolver: Arc<T>,
        clock: Arc<C>,
        config: TrackerConfig,
    ) -> TrackerResult<Self> {
        let facade = Self::new(edges, history, resolver, clock, config);
        facade.graph.hydrate().await?;
        Ok(facade)
    }

    /// Returns the underlying dependency graph service.
    #[must_use]
    pub const fn graph(&self) -> &DependencyGraphService<D, T, C> {
        &self.graph
    }

    /// Returns the underlying status service.
    #[must_use]
    pub const fn status(&self) -> &StatusTransitionService<S, T, C> {
        &self.status
    }

    /// Reloads the graph index from storage.
    ///
    /// # Errors
    ///
    /// Returns [`super::TrackerError::Dependency`] when loading fails.
    pub async fn hydrate(&self) -> TrackerResult<usize> {
        Ok(self.graph.hydrate().await?)
    }

    /// Adds a dependency edge.
    ///
    /// # Errors
    ///
    /// See [`DependencyGraphService::add_dependency`].
    pub async fn add_dependency(
        &self,
        request: AddDependencyRequest,
    ) -> TrackerResult<DependencyEdge> {
        Ok(self.graph.add_dependency(request).await?)
    }

    /// Removes the edge between two tasks, returning whether one existed.
    ///
    /// # Errors
    ///
    /// See [`DependencyGraphService::remove_dependency`].
    pub async fn remove_dependency(
        &self,
        predecessor: &TaskIdentity,
        successor: &TaskIdentity,
    ) -> TrackerResult<bool> {
        Ok(self
            .graph
            .remove_dependency(predecessor, successor)
            .await?)
    }

    /// Direct predecessors of `task`.
    pub async fn predecessors_of(&self, task: &TaskIdentity) -> BTreeSet<TaskIdentity> {
        self.graph.predecessors_of(task).await
    }

    /// Direct successors of `task`.
    pub async fn successors_of(&self, task: &TaskIdentity) -> BTreeSet<TaskIdentity> {
        self.graph.successors_of(task).await
    }

    /// Edges pointing into `task`, with their types.
    pub async fn dependencies_of(&self, task: &TaskIdentity) -> Vec<DependencyEdge> {
        self.graph.dependencies_of(task).await
    }

    /// Returns whether `to` is reachable from `from`.
    pub async fn is_reachable(&self, from: &TaskIdentity, to: &TaskIdentity) -> bool {
        self.graph.is_reachable(from, to).await
    }

    /// Snapshot of every edge, ordered by creation time.
    pub async fn edges(&self) -> Vec<DependencyEdge> {
        self.graph.edges().await
    }

    /// Moves a task to a new status.
    ///
    /// Prerequisites are not enforced here; use [`Self::can_start`] first when
    /// the caller wants that gate.
    ///
    /// # Errors
    ///
    /// See [`StatusTransitionService::transition`].
    pub async fn transition(&self, request: TransitionRequest) -> TrackerResult<TransitionRecord> {
        Ok(self.status.transition(request).await?)
    }

    /// Approves a pending transition.
    ///
    /// # Errors
    ///
    /// See [`StatusTransitionService::approve`].
    pub async fn approve(
        &self,
        id: TransitionRecordId,
        approver: Actor,
    ) -> TrackerResult<TransitionRecord> {
        Ok(self.status.approve(id, approver).await?)
    }

    /// Effective status of `task`.
    ///
    /// # Errors
    ///
    /// See [`StatusTransitionService::current_status`].
    pub async fn current_status(&self, task: &TaskIdentity) -> TrackerResult<TaskStatus> {
        Ok(self.status.current_status(task).await?)
    }

    /// Status history of `task`, oldest first.
    ///
    /// # Errors
    ///
    /// See [`StatusTransitionService::history`].
    pub async fn history(&self, task: &TaskIdentity) -> TrackerResult<Vec<TransitionRecord>> {
        Ok(self.status.history(task).await?)
    }

    /// Statuses `task` may move to next.
    ///
    /// # Errors
    ///
    /// See [`StatusTransitionService::allowed_transitions`].
    pub async fn allowed_transitions(
        &self,
        task: &TaskIdentity,
    ) -> TrackerResult<BTreeSet<TaskStatus>> {
        Ok(self.status.allowed_transitions(task).await?)
    }

    /// The transition awaiting approval for `task`, if any.
    ///
    /// # Errors
    ///
    /// See [`StatusTransitionService::pending_approval`].
    pub async fn pending_approval(
        &self,
        task: &TaskIdentity,
    ) -> TrackerResult<Option<TransitionRecord>> {
        Ok(self.status.pending_approval(task).await?)
    }

    /// `finish_to_start` edges into `task` whose predecessor is not completed.
    ///
    /// # Errors
    ///
    /// Returns [`super::TrackerError::Status`] when a predecessor's history
    /// cannot be loaded.
    pub async fn unmet_prerequisites(
        &self,
        task: &TaskIdentity,
    ) -> TrackerResult<Vec<DependencyEdge>> {
        let mut unmet = Vec::new();
        for edge in self.graph.dependencies_of(task).await {
            if !edge.dependency_type().is_finish_to_start() {
                continue;
            }
            let status = self.status.current_status(edge.predecessor()).await?;
            if status != TaskStatus::Completed {
                unmet.push(edge);
            }
        }
        Ok(unmet)
    }

    /// Returns whether every `finish_to_start` predecessor of `task` is
    /// completed.
    ///
    /// Advisory only: [`Self::transition`] does not consult it.
    ///
    /// # Errors
    ///
    /// Returns [`super::TrackerError::Status`] when a predecessor's history
    /// cannot be loaded.
    pub async fn can_start(&self, task: &TaskIdentity) -> TrackerResult<bool> {
        let unmet = self.unmet_prerequisites(task).await?;
        debug!(%task, unmet = unmet.len(), "start readiness evaluated");
        Ok(unmet.is_empty())
    }
}
