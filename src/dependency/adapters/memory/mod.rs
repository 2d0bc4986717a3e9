//! In-memory adapters for dependency edge persistence.

mod edges;

pub use edges::InMemoryDependencyRepository;
