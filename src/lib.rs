//! Precedence: task dependency graph and status transition engine.
//!
//! This crate keeps the precedence relationships between tasks acyclic and
//! drives each task through a guarded lifecycle, recording every status
//! change in an append-only audit trail.
//!
//! # Architecture
//!
//! Precedence follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`task`]: Task identities and the resolver confirming they exist
//! - [`dependency`]: Acyclic dependency graph between tasks
//! - [`status`]: Lifecycle state machine, approval gate, and history
//! - [`tracker`]: Facade composing the graph and the status engine

pub mod dependency;
pub mod status;
pub mod task;
pub mod tracker;
