//! In-memory repository for dependency edges.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::dependency::{
    domain::DependencyEdge,
    ports::{DependencyEdgeRepository, DependencyRepositoryError, DependencyRepositoryResult},
};
use crate::task::domain::TaskIdentity;

/// Thread-safe in-memory dependency edge repository.
///
/// Edges are kept in insertion order so [`DependencyEdgeRepository::load_edges`]
/// returns them oldest first.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDependencyRepository {
    edges: Arc<RwLock<Vec<DependencyEdge>>>,
}

impl InMemoryDependencyRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository seeded with edges, bypassing all validation.
    ///
    /// Useful for simulating previously persisted (possibly corrupt) data.
    #[must_use]
    pub fn with_edges(edges: impl IntoIterator<Item = DependencyEdge>) -> Self {
        Self {
            edges: Arc::new(RwLock::new(edges.into_iter().collect())),
        }
    }

    /// Returns the number of stored edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.read().map_or(0, |guard| guard.len())
    }

    /// Returns `true` if no edges are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn connects(edge: &DependencyEdge, predecessor: &TaskIdentity, successor: &TaskIdentity) -> bool {
    edge.predecessor() == predecessor && edge.successor() == successor
}

#[async_trait]
impl DependencyEdgeRepository for InMemoryDependencyRepository {
    async fn save_edge(&self, edge: &DependencyEdge) -> DependencyRepositoryResult<()> {
        let mut edges = self.edges.write().map_err(|err| {
            DependencyRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if edges
            .iter()
            .any(|stored| connects(stored, edge.predecessor(), edge.successor()))
        {
            return Err(DependencyRepositoryError::DuplicateEdge {
                predecessor: edge.predecessor().clone(),
                successor: edge.successor().clone(),
            });
        }
        edges.push(edge.clone());
        Ok(())
    }

    async fn delete_edge(
        &self,
        predecessor: &TaskIdentity,
        successor: &TaskIdentity,
    ) -> DependencyRepositoryResult<bool> {
        let mut edges = self.edges.write().map_err(|err| {
            DependencyRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let before = edges.len();
        edges.retain(|stored| !connects(stored, predecessor, successor));
        Ok(edges.len() != before)
    }

    async fn load_edges(&self) -> DependencyRepositoryResult<Vec<DependencyEdge>> {
        let edges = self.edges.read().map_err(|err| {
            DependencyRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(edges.clone())
    }
}
