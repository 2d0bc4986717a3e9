//! Port contracts consumed by the task reference layer.
//!
//! Ports define infrastructure-agnostic interfaces used by graph and status
//! services.

pub mod resolver;

pub use resolver::{TaskRefResolver, TaskResolverError, TaskResolverResult};
