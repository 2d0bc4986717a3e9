//! Task lifecycle status engine.
//!
//! Validates status changes against a data-driven transition table, gates
//! selected changes behind approval, and keeps an append-only audit trail of
//! every change. The module follows the same hexagonal split as the rest of
//! the crate:
//!
//! - Domain types, the transition table, and records in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
