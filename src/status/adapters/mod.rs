//! Adapter implementations for transition history ports.

pub mod memory;
pub mod postgres;
