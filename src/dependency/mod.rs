//! Task dependency graph.
//!
//! Maintains a directed precedence graph between task identities and refuses
//! any edge that would introduce a self-loop or a cycle. The module follows
//! the same hexagonal split as the rest of the crate:
//!
//! - Domain types and the adjacency index in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
