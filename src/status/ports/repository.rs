//! Repository port for the append-only transition history.

use crate::status::domain::{Actor, TaskStatus, TransitionRecord, TransitionRecordId};
use crate::task::domain::TaskIdentity;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for transition repository operations.
pub type TransitionRepositoryResult<T> = Result<T, TransitionRepositoryError>;

/// Transition history persistence contract.
///
/// Implementations re-check the chain inside the append's transactional
/// boundary with [`verify_append`], so a stale writer can never fork a task's
/// history.
#[async_trait]
pub trait TransitionRepository: Send + Sync {
    /// Appends a record to its task's history.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionRepositoryError::DuplicateRecord`] when the id is
    /// already stored, [`TransitionRepositoryError::ChainConflict`] when the
    /// record does not continue from the latest stored status, and
    /// [`TransitionRepositoryError::ApprovalPending`] when the task still has
    /// a pending record.
    async fn append_transition(&self, record: &TransitionRecord) -> TransitionRepositoryResult<()>;

    /// Loads a task's history, oldest first.
    async fn load_transitions(
        &self,
        task: &TaskIdentity,
    ) -> TransitionRepositoryResult<Vec<TransitionRecord>>;

    /// Finds a record by id.
    async fn find_transition(
        &self,
        id: TransitionRecordId,
    ) -> TransitionRepositoryResult<Option<TransitionRecord>>;

    /// Stamps a pending record as approved and returns the updated record.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionRepositoryError::NotFound`] for an unknown id and
    /// [`TransitionRepositoryError::NotPending`] when the record is not
    /// awaiting approval.
    async fn record_approval(
        &self,
        id: TransitionRecordId,
        approver: &Actor,
        approved_at: DateTime<Utc>,
    ) -> TransitionRepositoryResult<TransitionRecord>;
}

/// Errors returned by transition repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TransitionRepositoryError {
    /// A record with the same id already exists.
    #[error("duplicate transition record: {0}")]
    DuplicateRecord(TransitionRecordId),

    /// No record exists with the given id.
    #[error("transition record not found: {0}")]
    NotFound(TransitionRecordId),

    /// The record does not continue the task's history.
    #[error("transition chain conflict for {task}: expected from {expected}, found {found:?}")]
    ChainConflict {
        /// Task whose history was being extended.
        task: TaskIdentity,
        /// Status the stored history ends in.
        expected: TaskStatus,
        /// Source status carried by the rejected record.
        found: Option<TaskStatus>,
    },

    /// The task's latest record still awaits approval.
    #[error("task {task} has transition {pending} awaiting approval")]
    ApprovalPending {
        /// Task whose history was being extended.
        task: TaskIdentity,
        /// The record awaiting approval.
        pending: TransitionRecordId,
    },

    /// The record is not awaiting approval.
    #[error("transition record {0} is not awaiting approval")]
    NotPending(TransitionRecordId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TransitionRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

/// Checks that `record` may be appended after `latest`.
///
/// An empty history continues from the implicit initial status; a record
/// without a source status is accepted only as a task's first entry.
///
/// # Errors
///
/// Returns [`TransitionRepositoryError::ApprovalPending`] when `latest` is
/// pending and [`TransitionRepositoryError::ChainConflict`] when the source
/// status does not match.
pub fn verify_append(
    latest: Option<&TransitionRecord>,
    record: &TransitionRecord,
) -> TransitionRepositoryResult<()> {
    let Some(previous) = latest else {
        return match record.from_status() {
            None | Some(TaskStatus::INITIAL) => Ok(()),
            found => Err(TransitionRepositoryError::ChainConflict {
                task: record.task().clone(),
                expected: TaskStatus::INITIAL,
                found,
            }),
        };
    };

    if previous.is_pending() {
        return Err(TransitionRepositoryError::ApprovalPending {
            task: record.task().clone(),
            pending: previous.id(),
        });
    }
    if record.from_status() != Some(previous.to_status()) {
        return Err(TransitionRepositoryError::ChainConflict {
            task: record.task().clone(),
            expected: previous.to_status(),
            found: record.from_status(),
        });
    }
    Ok(())
}
