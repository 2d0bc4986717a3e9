//! Keyed async locks serializing work on a single task.

use crate::task::domain::TaskIdentity;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per task identity.
///
/// Work on different tasks proceeds in parallel; work on the same task is
/// serialized for as long as the returned guard lives.
#[derive(Debug, Default)]
pub struct TaskLockRegistry {
    locks: Mutex<HashMap<TaskIdentity, Arc<Mutex<()>>>>,
}

impl TaskLockRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `task`.
    pub async fn lock(&self, task: &TaskIdentity) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|key, lock| key == task || Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(task.clone()).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of tasks with a lock entry.
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }

    /// Returns `true` if no task has a lock entry.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
