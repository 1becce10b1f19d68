//! Hosted board tests covering sign-in, task loading and fallback.

use super::helpers::{ACCESS_TOKEN, USER_ID, session_body, task_row};
use mockito::Matcher;
use rstest::rstest;
use serde_json::json;
use taskboard::{app::HostedTaskBoard, config::BackendConfig};

fn board_for(server: &mockito::ServerGuard) -> HostedTaskBoard {
    let config =
        BackendConfig::new(&server.url(), super::helpers::ANON_KEY).expect("valid config");
    HostedTaskBoard::connect(&config).expect("board should connect")
}

async fn mock_sign_in(server: &mut mockito::ServerGuard) -> mockito::Mock {
    server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(session_body().to_string())
        .create_async()
        .await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn login_loads_tasks_with_session_token() {
    let mut server = mockito::Server::new_async().await;
    let _token = mock_sign_in(&mut server).await;
    let select = server
        .mock("GET", "/rest/v1/tasks")
        .match_query(Matcher::Any)
        .match_header("authorization", format!("Bearer {ACCESS_TOKEN}").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([task_row("r-1", "From the table", "done")]).to_string())
        .create_async()
        .await;
    let mut board = board_for(&server);
    board.start().await;

    board
        .login("ada@example.com", "analytical-engine")
        .await
        .expect("login should succeed");

    select.assert_async().await;
    let [_, _, done] = board.tasks().columns();
    assert_eq!(done.len(), 1);
    assert_eq!(
        board
            .identity()
            .current_user()
            .map(|user| user.id().as_str().to_owned()),
        Some(USER_ID.to_owned())
    );
    board.shutdown();
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failing_table_service_shows_demo_board() {
    let mut server = mockito::Server::new_async().await;
    let _token = mock_sign_in(&mut server).await;
    server
        .mock("GET", "/rest/v1/tasks")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;
    let mut board = board_for(&server);

    board
        .login("ada@example.com", "analytical-engine")
        .await
        .expect("login should succeed");

    assert_eq!(board.tasks().tasks().len(), 6);
    assert!(
        board
            .tasks()
            .tasks()
            .iter()
            .all(|task| task.created_by().as_str() == USER_ID)
    );
}
