//! Domain model for the task dependency graph.
//!
//! Edges are plain values keyed by task identity; the adjacency index answers
//! neighbour and reachability queries without holding object references.

mod edge;
mod error;
mod graph;

pub use edge::{DependencyEdge, DependencyType, PersistedDependencyEdge};
pub use error::DependencyDomainError;
pub use graph::{CyclePath, DependencyIndex};
