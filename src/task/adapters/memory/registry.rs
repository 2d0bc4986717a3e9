//! In-memory task registry for tests and embedded use.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::TaskIdentity,
    ports::{TaskRefResolver, TaskResolverError, TaskResolverResult},
};

/// Thread-safe registry of known task identities.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRegistry {
    tasks: Arc<RwLock<HashSet<TaskIdentity>>>,
}

impl InMemoryTaskRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with the given identities.
    #[must_use]
    pub fn with_tasks(tasks: impl IntoIterator<Item = TaskIdentity>) -> Self {
        Self {
            tasks: Arc::new(RwLock::new(tasks.into_iter().collect())),
        }
    }

    /// Registers a task identity.
    ///
    /// Returns `false` when the identity was already registered.
    ///
    /// # Errors
    ///
    /// Returns [`TaskResolverError::Unavailable`] when the registry lock is
    /// poisoned.
    pub fn register(&self, task: TaskIdentity) -> TaskResolverResult<bool> {
        let mut tasks = self.tasks.write().map_err(|err| {
            TaskResolverError::unavailable(std::io::Error::other(err.to_string()))
        })?;
        Ok(tasks.insert(task))
    }

    /// Removes a task identity, returning whether it was present.
    ///
    /// # Errors
    ///
    /// Returns [`TaskResolverError::Unavailable`] when the registry lock is
    /// poisoned.
    pub fn forget(&self, task: &TaskIdentity) -> TaskResolverResult<bool> {
        let mut tasks = self.tasks.write().map_err(|err| {
            TaskResolverError::unavailable(std::io::Error::other(err.to_string()))
        })?;
        Ok(tasks.remove(task))
    }
}

#[async_trait]
impl TaskRefResolver for InMemoryTaskRegistry {
    async fn exists(&self, task: &TaskIdentity) -> TaskResolverResult<bool> {
        let tasks = self.tasks.read().map_err(|err| {
            TaskResolverError::unavailable(std::io::Error::other(err.to_string()))
        })?;
        Ok(tasks.contains(task))
    }
}
