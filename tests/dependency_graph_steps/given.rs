//! Given steps for dependency graph BDD scenarios.

use super::world::{DependencyWorld, parse_task, run_async};
use eyre::WrapErr;
use precedence::dependency::{domain::DependencyType, services::AddDependencyRequest};
use rstest_bdd_macros::given;

#[given(r#"a task "{task}" exists"#)]
fn task_exists(world: &mut DependencyWorld, task: String) -> Result<(), eyre::Report> {
    let identity = parse_task(&task)?;
    world
        .registry
        .register(identity)
        .wrap_err("register task in scenario setup")?;
    Ok(())
}

#[given(r#""{predecessor}" has been linked before "{successor}""#)]
fn linked_before(
    world: &mut DependencyWorld,
    predecessor: String,
    successor: String,
) -> Result<(), eyre::Report> {
    let request = AddDependencyRequest::new(
        parse_task(&predecessor)?,
        parse_task(&successor)?,
        DependencyType::finish_to_start(),
    );
    run_async(world.tracker.add_dependency(request)).wrap_err("link tasks in scenario setup")?;
    Ok(())
}
