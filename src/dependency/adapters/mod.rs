//! Adapter implementations for dependency edge persistence.

pub mod memory;
pub mod postgres;
