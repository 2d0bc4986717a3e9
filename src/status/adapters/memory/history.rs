//! In-memory append-only transition history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::status::{
    domain::{Actor, TransitionRecord, TransitionRecordId},
    ports::{
        TransitionRepository, TransitionRepositoryError, TransitionRepositoryResult,
        verify_append,
    },
};
use crate::task::domain::TaskIdentity;

/// Thread-safe in-memory transition repository.
///
/// Appends verify the chain under the same write lock that stores the record,
/// matching the transactional guarantee of the database adapter.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransitionRepository {
    state: Arc<RwLock<InMemoryHistoryState>>,
}

#[derive(Debug, Default)]
struct InMemoryHistoryState {
    histories: HashMap<TaskIdentity, Vec<TransitionRecord>>,
    id_index: HashMap<TransitionRecordId, TaskIdentity>,
}

impl InMemoryTransitionRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records stored across all tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().map_or(0, |state| state.id_index.len())
    }

    /// Returns `true` if no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock_poisoned(err: impl std::fmt::Display) -> TransitionRepositoryError {
    TransitionRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TransitionRepository for InMemoryTransitionRepository {
    async fn append_transition(&self, record: &TransitionRecord) -> TransitionRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.id_index.contains_key(&record.id()) {
            return Err(TransitionRepositoryError::DuplicateRecord(record.id()));
        }

        let latest = state
            .histories
            .get(record.task())
            .and_then(|history| history.last());
        verify_append(latest, record)?;

        state.id_index.insert(record.id(), record.task().clone());
        state
            .histories
            .entry(record.task().clone())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    async fn load_transitions(
        &self,
        task: &TaskIdentity,
    ) -> TransitionRepositoryResult<Vec<TransitionRecord>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.histories.get(task).cloned().unwrap_or_default())
    }

    async fn find_transition(
        &self,
        id: TransitionRecordId,
    ) -> TransitionRepositoryResult<Option<TransitionRecord>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let found = state
            .id_index
            .get(&id)
            .and_then(|task| state.histories.get(task))
            .and_then(|history| history.iter().find(|record| record.id() == id))
            .cloned();
        Ok(found)
    }

    async fn record_approval(
        &self,
        id: TransitionRecordId,
        approver: &Actor,
        approved_at: DateTime<Utc>,
    ) -> TransitionRepositoryResult<TransitionRecord> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let task = state
            .id_index
            .get(&id)
            .cloned()
            .ok_or(TransitionRepositoryError::NotFound(id))?;
        let record = state
            .histories
            .get_mut(&task)
            .and_then(|history| history.iter_mut().find(|record| record.id() == id))
            .ok_or(TransitionRepositoryError::NotFound(id))?;

        let approved = record
            .approved(approver.clone(), approved_at)
            .map_err(|_| TransitionRepositoryError::NotPending(id))?;
        *record = approved.clone();
        Ok(approved)
    }
}
