//! Adapter implementations for task reference ports.

pub mod memory;
