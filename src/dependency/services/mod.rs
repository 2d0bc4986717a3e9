//! Application services for dependency graph maintenance.

mod graph;

pub use graph::{
    AddDependencyRequest, DependencyGraphError, DependencyGraphResult, DependencyGraphService,
};
