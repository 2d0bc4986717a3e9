//! Domain model for task references.
//!
//! Tasks themselves live in the surrounding tracker. This crate only carries
//! their composite identity, which both the dependency graph and the status
//! engine use as a foreign key.

mod error;
mod ids;

pub use error::TaskDomainError;
pub use ids::{ProjectId, TaskIdentity, TaskNumber};
