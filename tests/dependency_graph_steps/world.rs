//! Shared world state for dependency graph BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use precedence::dependency::{
    adapters::memory::InMemoryDependencyRepository, domain::DependencyEdge,
};
use precedence::status::adapters::memory::InMemoryTransitionRepository;
use precedence::task::{adapters::memory::InMemoryTaskRegistry, domain::TaskIdentity};
use precedence::tracker::{DependencyStatusFacade, TrackerConfig, TrackerResult};
use rstest::fixture;

/// Facade type used by the BDD world.
pub type TestTracker = DependencyStatusFacade<
    InMemoryDependencyRepository,
    InMemoryTransitionRepository,
    InMemoryTaskRegistry,
    DefaultClock,
>;

/// Scenario world for dependency graph behaviour tests.
pub struct DependencyWorld {
    pub registry: Arc<InMemoryTaskRegistry>,
    pub tracker: Arc<TestTracker>,
    pub last_result: Option<TrackerResult<DependencyEdge>>,
    pub race_results: Vec<TrackerResult<DependencyEdge>>,
}

impl DependencyWorld {
    /// Creates a world with an empty registry and graph.
    #[must_use]
    pub fn new() -> Self {
        let registry = Arc::new(InMemoryTaskRegistry::new());
        let tracker = DependencyStatusFacade::new(
            Arc::new(InMemoryDependencyRepository::new()),
            Arc::new(InMemoryTransitionRepository::new()),
            Arc::clone(&registry),
            Arc::new(DefaultClock),
            TrackerConfig::default(),
        );

        Self {
            registry,
            tracker: Arc::new(tracker),
            last_result: None,
            race_results: Vec::new(),
        }
    }
}

impl Default for DependencyWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> DependencyWorld {
    DependencyWorld::default()
}

/// Parses a `project/number` reference from a scenario.
pub fn parse_task(raw: &str) -> Result<TaskIdentity, eyre::Report> {
    raw.parse()
        .map_err(|err| eyre::eyre!("invalid task reference {raw:?} in scenario: {err}"))
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
