//! Port contracts for dependency edge persistence.

pub mod repository;

pub use repository::{
    DependencyEdgeRepository, DependencyRepositoryError, DependencyRepositoryResult,
};
