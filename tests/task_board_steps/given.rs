//! Given steps for task board BDD scenarios.

use super::world::{BoardWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskboard::{
    identity::domain::Credentials,
    task::domain::{TaskDraft, TaskTitle},
};

#[given(r#"an account "{email}" with password "{password}""#)]
fn account_exists(
    world: &mut BoardWorld,
    email: String,
    password: String,
) -> Result<(), eyre::Report> {
    let credentials = Credentials::try_from_parts(&email, &password)
        .wrap_err("build account credentials")?;
    world
        .provider
        .add_account(&credentials)
        .wrap_err("register scenario account")?;
    Ok(())
}

#[given(r#"the user is signed in as "{email}" with password "{password}""#)]
fn user_signed_in(
    world: &mut BoardWorld,
    email: String,
    password: String,
) -> Result<(), eyre::Report> {
    run_async(world.board.login(&email, &password)).wrap_err("sign in for scenario setup")?;
    Ok(())
}

#[given(r#"the user has added a task titled "{title}""#)]
fn task_added(world: &mut BoardWorld, title: String) -> Result<(), eyre::Report> {
    let draft = TaskDraft::new(TaskTitle::new(title).wrap_err("scenario task title")?);
    run_async(world.board.tasks_mut().add_task(draft))
        .ok_or_else(|| eyre::eyre!("task was not added; is a user signed in?"))?;
    Ok(())
}

#[given("the task table is unreachable")]
fn task_table_unreachable(world: &mut BoardWorld) {
    world.rows.set_offline(true);
}
