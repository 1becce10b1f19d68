//! In-memory integration tests for editing tasks on a signed-in board.

use super::helpers::{EMAIL, Harness, PASSWORD, TestBoard, draft, harness, titles};
use rstest::rstest;
use taskboard::task::domain::{TaskId, TaskPatch, TaskPriority, TaskStatus, TaskTitle};

async fn signed_in(mut harness: Harness) -> Harness {
    harness
        .board
        .login(EMAIL, PASSWORD)
        .await
        .expect("login should succeed");
    harness
}

async fn add(board: &mut TestBoard, title: &str) -> TaskId {
    board
        .tasks_mut()
        .add_task(draft(title))
        .await
        .map(|task| task.id().clone())
        .expect("task should be added")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn new_tasks_are_listed_newest_first(harness: Harness) {
    let Harness { mut board, rows, .. } = signed_in(harness).await;

    add(&mut board, "First").await;
    add(&mut board, "Second").await;
    board.tasks_mut().fetch_tasks().await;

    assert_eq!(titles(&board), ["Second", "First"]);
    assert_eq!(rows.rows().expect("rows readable").len(), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn added_task_gets_store_assigned_identity(harness: Harness) {
    let Harness { mut board, .. } = signed_in(harness).await;

    let id = add(&mut board, "Stored").await;

    let task = board.tasks().task(&id).expect("task is listed");
    assert_eq!(task.status(), TaskStatus::Todo);
    assert_eq!(task.priority(), TaskPriority::Medium);
    assert_eq!(
        Some(task.created_by()),
        board.identity().current_user().as_ref().map(|user| user.id())
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn edits_persist_across_fetches(harness: Harness) {
    let Harness { mut board, .. } = signed_in(harness).await;
    let id = add(&mut board, "Draft blog post").await;

    board
        .tasks_mut()
        .update_task(
            &id,
            TaskPatch::new()
                .with_title(TaskTitle::new("Publish blog post").expect("valid title"))
                .with_description("Proofread first")
                .with_priority(TaskPriority::High),
        )
        .await;
    board.tasks_mut().fetch_tasks().await;

    let task = board.tasks().task(&id).expect("task is listed");
    assert_eq!(task.title().as_str(), "Publish blog post");
    assert_eq!(task.description(), "Proofread first");
    assert_eq!(task.priority(), TaskPriority::High);
    assert!(task.updated_at() > task.created_at());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn moving_a_task_changes_its_column(harness: Harness) {
    let Harness { mut board, .. } = signed_in(harness).await;
    let id = add(&mut board, "Review PR").await;
    add(&mut board, "Write tests").await;

    board.tasks_mut().move_task(&id, TaskStatus::Done).await;
    board.tasks_mut().fetch_tasks().await;

    let [todo, in_progress, done] = board.tasks().columns();
    assert_eq!(todo.len(), 1);
    assert!(in_progress.is_empty());
    let done_titles: Vec<&str> = done.tasks().iter().map(|task| task.title().as_str()).collect();
    assert_eq!(done_titles, ["Review PR"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleted_task_is_gone_remotely_and_locally(harness: Harness) {
    let Harness { mut board, rows, .. } = signed_in(harness).await;
    let keep = add(&mut board, "Keep").await;
    let drop_id = add(&mut board, "Drop").await;

    board.tasks_mut().delete_task(&drop_id).await;

    assert_eq!(titles(&board), ["Keep"]);
    let stored: Vec<TaskId> = rows
        .rows()
        .expect("rows readable")
        .iter()
        .map(|task| task.id().clone())
        .collect();
    assert_eq!(stored, [keep]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_ids_are_ignored(harness: Harness) {
    let Harness { mut board, .. } = signed_in(harness).await;
    add(&mut board, "Only task").await;
    let unknown = TaskId::new("does-not-exist").expect("valid id");

    board
        .tasks_mut()
        .move_task(&unknown, TaskStatus::InProgress)
        .await;
    board.tasks_mut().delete_task(&unknown).await;

    assert_eq!(titles(&board), ["Only task"]);
}
