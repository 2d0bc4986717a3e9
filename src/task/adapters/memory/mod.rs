//! In-memory adapters for task reference ports.

mod registry;

pub use registry::InMemoryTaskRegistry;
