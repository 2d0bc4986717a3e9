//! Single entry point composing the dependency graph and the status engine.
//!
//! [`DependencyStatusFacade`] wires both services to shared resolver and
//! clock handles, applies a [`TrackerConfig`], and answers the questions that
//! need both halves, such as whether a task may start.

mod config;
mod error;
mod facade;

pub use config::{ConfigError, TrackerConfig};
pub use error::{ErrorKind, TrackerError, TrackerResult};
pub use facade::DependencyStatusFacade;

#[cfg(test)]
mod tests;
