//! Then steps for dependency graph BDD scenarios.

use super::world::{DependencyWorld, parse_task, run_async};
use precedence::dependency::{domain::DependencyDomainError, services::DependencyGraphError};
use precedence::tracker::TrackerError;
use rstest_bdd_macros::then;

fn last_error(world: &DependencyWorld) -> Result<&TrackerError, eyre::Report> {
    match world.last_result.as_ref() {
        Some(Err(err)) => Ok(err),
        Some(Ok(edge)) => Err(eyre::eyre!("expected a rejection, but {edge} was accepted")),
        None => Err(eyre::eyre!("missing dependency result")),
    }
}

fn is_circular(err: &TrackerError) -> bool {
    matches!(
        err,
        TrackerError::Dependency(DependencyGraphError::CircularDependency { .. })
    )
}

#[then("the dependency is accepted")]
fn dependency_accepted(world: &DependencyWorld) -> Result<(), eyre::Report> {
    match world.last_result.as_ref() {
        Some(Ok(_)) => Ok(()),
        Some(Err(err)) => Err(eyre::eyre!("expected the dependency to be accepted: {err}")),
        None => Err(eyre::eyre!("missing dependency result")),
    }
}

#[then(r#""{successor}" depends on "{predecessor}""#)]
fn depends_on(
    world: &DependencyWorld,
    successor: String,
    predecessor: String,
) -> Result<(), eyre::Report> {
    let successor = parse_task(&successor)?;
    let predecessor = parse_task(&predecessor)?;
    let predecessors = run_async(world.tracker.predecessors_of(&successor));
    eyre::ensure!(
        predecessors.contains(&predecessor),
        "expected {successor} to depend on {predecessor}, found {predecessors:?}"
    );
    Ok(())
}

#[then("the dependency fails with a circular dependency error")]
fn fails_circular(world: &DependencyWorld) -> Result<(), eyre::Report> {
    let err = last_error(world)?;
    eyre::ensure!(is_circular(err), "expected CircularDependency, got {err:?}");
    Ok(())
}

#[then("the dependency fails with a self dependency error")]
fn fails_self_dependency(world: &DependencyWorld) -> Result<(), eyre::Report> {
    let err = last_error(world)?;
    eyre::ensure!(
        matches!(
            err,
            TrackerError::Dependency(DependencyGraphError::Domain(
                DependencyDomainError::SelfDependency(_)
            ))
        ),
        "expected SelfDependency, got {err:?}"
    );
    Ok(())
}

#[then("the dependency fails with an unknown task error")]
fn fails_unknown_task(world: &DependencyWorld) -> Result<(), eyre::Report> {
    let err = last_error(world)?;
    eyre::ensure!(
        matches!(
            err,
            TrackerError::Dependency(DependencyGraphError::UnknownTask(_))
        ),
        "expected UnknownTask, got {err:?}"
    );
    Ok(())
}

#[then("the graph edge count is {count:u64}")]
fn edge_count(world: &DependencyWorld, count: u64) -> Result<(), eyre::Report> {
    let edges = run_async(world.tracker.edges());
    let expected = usize::try_from(count)?;
    eyre::ensure!(
        edges.len() == expected,
        "expected {expected} edges, found {}",
        edges.len()
    );
    Ok(())
}

#[then("exactly one concurrent link is accepted")]
fn one_link_accepted(world: &DependencyWorld) -> Result<(), eyre::Report> {
    let accepted = world
        .race_results
        .iter()
        .filter(|result| result.is_ok())
        .count();
    eyre::ensure!(accepted == 1, "expected one accepted link, found {accepted}");
    Ok(())
}

#[then("the other concurrent link fails with a circular dependency error")]
fn other_link_circular(world: &DependencyWorld) -> Result<(), eyre::Report> {
    let rejected: Vec<_> = world
        .race_results
        .iter()
        .filter_map(|result| result.as_ref().err())
        .collect();
    eyre::ensure!(
        rejected.len() == 1 && rejected.iter().all(|err| is_circular(err)),
        "expected one CircularDependency rejection, got {rejected:?}"
    );
    Ok(())
}
