//! `PostgreSQL` adapter for transition history persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresTransitionRepository, TransitionPgPool};
