//! `PostgreSQL` adapters for dependency edge persistence.

mod models;
mod repository;
mod schema;

pub use repository::{DependencyPgPool, PostgresDependencyRepository};
