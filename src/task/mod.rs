//! Task references shared by the dependency graph and the status engine.
//!
//! The surrounding tracker owns task storage and identity allocation; this
//! module only models the composite `(project, number)` identity and the
//! resolver port used to confirm that a referenced task exists:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;
