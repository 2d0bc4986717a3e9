//! Service layer enforcing the task status state machine.

use super::TaskLockRegistry;
use crate::status::{
    domain::{
        Actor, ApprovalPolicy, StatusDomainError, TaskStatus, TransitionDraft, TransitionRecord,
        TransitionRecordId, TransitionTable, TriggerKind,
    },
    ports::{TransitionRepository, TransitionRepositoryError},
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
use tracing::{debug, info};

/// Request payload for changing a task's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    task: TaskIdentity,
    to_status: TaskStatus,
    actor: Actor,
    reason: Option<String>,
    trigger_kind: TriggerKind,
    automated: Option<bool>,
    requires_approval: bool,
    deadline: Option<DateTime<Utc>>,
}

impl TransitionRequest {
    /// Creates a manual request moving `task` to `to_status`.
    #[must_use]
    pub const fn new(task: TaskIdentity, to_status: TaskStatus, actor: Actor) -> Self {
        Self {
            task,
            to_status,
            actor,
            reason: None,
            trigger_kind: TriggerKind::Manual,
            automated: None,
            requires_approval: false,
            deadline: None,
        }
    }

    /// Attaches a justification.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Sets what caused the change.
    ///
    /// Unless overridden with [`Self::automated`], the automation flag
    /// follows [`TriggerKind::is_automated`].
    #[must_use]
    pub const fn with_trigger(mut self, trigger_kind: TriggerKind) -> Self {
        self.trigger_kind = trigger_kind;
        self
    }

    /// Overrides whether the change counts as automated.
    #[must_use]
    pub const fn automated(mut self, automated: bool) -> Self {
        self.automated = Some(automated);
        self
    }

    /// Holds the change as pending until it is approved.
    #[must_use]
    pub const fn requiring_approval(mut self) -> Self {
        self.requires_approval = true;
        self
    }

    /// Aborts the request without mutation if not committed by `deadline`.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Returns the task the request targets.
    #[must_use]
    pub const fn task(&self) -> &TaskIdentity {
        &self.task
    }

    /// Returns the requested status.
    #[must_use]
    pub const fn to_status(&self) -> TaskStatus {
        self.to_status
    }
}

/// Service-level errors for status transitions.
#[derive(Debug, Error)]
pub enum StatusTransitionError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] StatusDomainError),

    /// The task does not exist.
    #[error("unknown task {0}")]
    UnknownTask(TaskIdentity),

    /// The task already has a transition awaiting approval.
    #[error("task {task} already has transition {pending} awaiting approval")]
    ApprovalAlreadyPending {
        /// Task the transition was requested for.
        task: TaskIdentity,
        /// The record awaiting approval.
        pending: TransitionRecordId,
    },

    /// No transition record has the given id.
    #[error("transition {0} not found")]
    TransitionNotFound(TransitionRecordId),

    /// The caller's deadline passed before the change could be committed.
    #[error("deadline exceeded before the status change was committed")]
    DeadlineExceeded,

    /// Repository operation failed.
    #[error(transparent)]
    Repository(TransitionRepositoryError),

    /// Task resolution failed.
    #[error(transparent)]
    Resolver(#[from] TaskResolverError),
}

impl From<TransitionRepositoryError> for StatusTransitionError {
    fn from(err: TransitionRepositoryError) -> Self {
        match err {
            TransitionRepositoryError::ApprovalPending { task, pending } => {
                Self::ApprovalAlreadyPending { task, pending }
            }
            TransitionRepositoryError::NotFound(id) => Self::TransitionNotFound(id),
            TransitionRepositoryError::NotPending(id) => {
                Self::Domain(StatusDomainError::NotPendingApproval(id))
            }
            other => Self::Repository(other),
        }
    }
}

/// Result type for status transition service operations.
pub type StatusTransitionResult<T> = Result<T, StatusTransitionError>;

/// Status transition orchestration service.
///
/// Each task's "read latest, validate, append" sequence runs under that
/// task's lock from a [`TaskLockRegistry`]; storage re-checks the chain on
/// append, so concurrent writers through different service instances still
/// cannot fork a history.
pub struct StatusTransitionService<R, T, C>
where
    R: TransitionRepository,
    T: TaskRefResolver,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    resolver: Arc<T>,
    clock: Arc<C>,
    table: TransitionTable,
    policy: ApprovalPolicy,
    locks: TaskLockRegistry,
}

impl<R, T, C> StatusTransitionService<R, T, C>
where
    R: TransitionRepository,
    T: TaskRefResolver,
    C: Clock + Send + Sync,
{
    /// Creates a service with the default table and no approval policy.
    #[must_use]
    pub fn new(repository: Arc<R>, resolver: Arc<T>, clock: Arc<C>) -> Self {
        Self {
            repository,
            resolver,
            clock,
            table: TransitionTable::default(),
            policy: ApprovalPolicy::none(),
            locks: TaskLockRegistry::new(),
        }
    }

    /// Replaces the transition table.
    #[must_use]
    pub fn with_table(mut self, table: TransitionTable) -> Self {
        self.table = table;
        self
    }

    /// Replaces the approval policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ApprovalPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the active transition table.
    #[must_use]
    pub const fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Returns the active approval policy.
    #[must_use]
    pub const fn policy(&self) -> &ApprovalPolicy {
        &self.policy
    }

    /// Moves a task to a new status and records the change.
    ///
    /// When the request or the policy demands approval the record is stored
    /// pending and the task's effective status is unchanged until
    /// [`Self::approve`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`StatusTransitionError::UnknownTask`],
    /// [`StatusTransitionError::ApprovalAlreadyPending`],
    /// [`StatusDomainError::TerminalState`] or
    /// [`StatusDomainError::IllegalTransition`] via
    /// [`StatusTransitionError::Domain`],
    /// [`StatusTransitionError::DeadlineExceeded`], or infrastructure errors.
    /// Nothing is written on failure.
    pub async fn transition(
        &self,
        request: TransitionRequest,
    ) -> StatusTransitionResult<TransitionRecord> {
        let TransitionRequest {
            task,
            to_status,
            actor,
            reason,
            trigger_kind,
            automated,
            requires_approval,
            deadline,
        } = request;
        if !self.resolver.exists(&task).await? {
            return Err(StatusTransitionError::UnknownTask(task));
        }

        let _guard = self.locks.lock(&task).await;
        let history = self.repository.load_transitions(&task).await?;
        if let Some(pending) = history.last().filter(|record| record.is_pending()) {
            debug!(%task, pending = %pending.id(), "transition rejected while approval pending");
            return Err(StatusTransitionError::ApprovalAlreadyPending {
                task,
                pending: pending.id(),
            });
        }

        let (current, entered_at) = effective_state(&history);
        if let Err(err) = self.table.check(&task, current, to_status) {
            debug!(%task, from = %current, to = %to_status, "status transition rejected");
            return Err(err.into());
        }
        self.ensure_before(deadline)?;

        let draft = TransitionDraft {
            task,
            from_status: current,
            to_status,
            actor,
            automated: automated.unwrap_or_else(|| trigger_kind.is_automated()),
            trigger_kind,
            reason,
            requires_approval: requires_approval || self.policy.requires_approval(to_status),
        };
        let record = TransitionRecord::new(draft, entered_at, &*self.clock);
        self.repository.append_transition(&record).await?;

        info!(
            task = %record.task(),
            from = %current,
            to = %record.to_status(),
            actor = %record.actor(),
            trigger = %record.trigger_kind(),
            pending = record.is_pending(),
            "status transition recorded"
        );
        Ok(record)
    }

    /// Approves a pending transition, making its status effective.
    ///
    /// # Errors
    ///
    /// Returns [`StatusTransitionError::TransitionNotFound`] for an unknown id,
    /// [`StatusDomainError::NotPendingApproval`] via
    /// [`StatusTransitionError::Domain`] when the record is not pending, or
    /// infrastructure errors.
    pub async fn approve(
        &self,
        id: TransitionRecordId,
        approver: Actor,
    ) -> StatusTransitionResult<TransitionRecord> {
        let record = self
            .repository
            .find_transition(id)
            .await?
            .ok_or(StatusTransitionError::TransitionNotFound(id))?;

        let _guard = self.locks.lock(record.task()).await;
        let approved = self
            .repository
            .record_approval(id, &approver, self.clock.utc())
            .await?;

        info!(
            task = %approved.task(),
            record = %id,
            to = %approved.to_status(),
            approver = %approver,
            "status transition approved"
        );
        Ok(approved)
    }

    /// Effective status of `task`.
    ///
    /// Derived from the newest approved or unguarded record; a task with no
    /// history is [`TaskStatus::INITIAL`].
    ///
    /// # Errors
    ///
    /// Returns [`StatusTransitionError::Repository`] when loading fails.
    pub async fn current_status(&self, task: &TaskIdentity) -> StatusTransitionResult<TaskStatus> {
        let history = self.repository.load_transitions(task).await?;
        Ok(effective_state(&history).0)
    }

    /// Full history of `task`, oldest first, including a pending record.
    ///
    /// # Errors
    ///
    /// Returns [`StatusTransitionError::Repository`] when loading fails.
    pub async fn history(
        &self,
        task: &TaskIdentity,
    ) -> StatusTransitionResult<Vec<TransitionRecord>> {
        Ok(self.repository.load_transitions(task).await?)
    }

    /// Statuses [`Self::transition`] would currently accept for `task`.
    ///
    /// Empty while a transition awaits approval or once the task is terminal.
    ///
    /// # Errors
    ///
    /// Returns [`StatusTransitionError::Repository`] when loading fails.
    pub async fn allowed_transitions(
        &self,
        task: &TaskIdentity,
    ) -> StatusTransitionResult<BTreeSet<TaskStatus>> {
        let history = self.repository.load_transitions(task).await?;
        if history.last().is_some_and(TransitionRecord::is_pending) {
            return Ok(BTreeSet::new());
        }
        Ok(self.table.allowed_from(effective_state(&history).0))
    }

    /// The transition awaiting approval for `task`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StatusTransitionError::Repository`] when loading fails.
    pub async fn pending_approval(
        &self,
        task: &TaskIdentity,
    ) -> StatusTransitionResult<Option<TransitionRecord>> {
        let history = self.repository.load_transitions(task).await?;
        Ok(history.into_iter().rev().find(TransitionRecord::is_pending))
    }

    fn ensure_before(&self, deadline: Option<DateTime<Utc>>) -> StatusTransitionResult<()> {
        match deadline {
            Some(limit) if self.clock.utc() > limit => Err(StatusTransitionError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

/// Current status and the time it took effect, ignoring pending records.
fn effective_state(history: &[TransitionRecord]) -> (TaskStatus, Option<DateTime<Utc>>) {
    history
        .iter()
        .rev()
        .find(|record| !record.is_pending())
        .map_or((TaskStatus::INITIAL, None), |record| {
            (record.to_status(), Some(record.effective_at()))
        })
}
