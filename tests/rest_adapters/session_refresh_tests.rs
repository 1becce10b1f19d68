//! Access-token refresh and session resumption against the mocked backend.

use std::sync::{Arc, Mutex};

use super::helpers::{
    ANON_KEY, REFRESH_TOKEN, REFRESHED_TOKEN, USER_ID, backend_for, expired_session,
    fresh_session, refreshed_body, task_row,
};
use mockito::{Matcher, Mock, ServerGuard};
use rstest::rstest;
use serde_json::json;
use taskboard::{
    app::HostedTaskBoard,
    config::BackendConfig,
    identity::{
        adapters::rest::RestIdentityProvider,
        domain::{AuthChangeEvent, Session, UserId},
        ports::{IdentityProvider, IdentityProviderError, Subscription},
    },
    task::{adapters::rest::RestTaskRowStore, ports::TaskRowStore},
};

type Events = Arc<Mutex<Vec<AuthChangeEvent>>>;

fn record_events(provider: &RestIdentityProvider) -> (Events, Subscription) {
    let events: Events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let subscription = provider.on_auth_state_change(Arc::new(
        move |event: AuthChangeEvent, _session: Option<Session>| {
            sink.lock().expect("events lock").push(event);
        },
    ));
    (events, subscription)
}

async fn mock_refresh(server: &mut ServerGuard) -> Mock {
    server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::UrlEncoded(
            "grant_type".into(),
            "refresh_token".into(),
        ))
        .match_header("apikey", ANON_KEY)
        .match_body(Matcher::Json(json!({ "refresh_token": REFRESH_TOKEN })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(refreshed_body().to_string())
        .create_async()
        .await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn expired_session_is_refreshed_on_lookup() {
    let mut server = mockito::Server::new_async().await;
    let refresh = mock_refresh(&mut server).await;
    let backend = backend_for(&server);
    backend.set_session(Some(expired_session()));
    let provider = RestIdentityProvider::new(backend.clone());
    let (events, _subscription) = record_events(&provider);

    let session = provider
        .get_session()
        .await
        .expect("refresh should succeed")
        .expect("session should be kept");

    refresh.assert_async().await;
    assert_eq!(session.access_token(), REFRESHED_TOKEN);
    assert_eq!(session.refresh_token(), Some("refresh-789"));
    assert!(!session.is_expired_at(chrono::Utc::now()));
    assert_eq!(
        backend.session().map(|held| held.access_token().to_owned()),
        Some(REFRESHED_TOKEN.to_owned())
    );
    assert_eq!(
        *events.lock().expect("events lock"),
        vec![
            AuthChangeEvent::InitialSession,
            AuthChangeEvent::TokenRefreshed
        ]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn fresh_session_is_not_refreshed() {
    let mut server = mockito::Server::new_async().await;
    let refresh = server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let backend = backend_for(&server);
    backend.set_session(Some(fresh_session()));
    let provider = RestIdentityProvider::new(backend);

    let session = provider.get_session().await.expect("lookup");

    refresh.assert_async().await;
    assert!(session.is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_refresh_signs_out() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "error": "invalid_grant",
                "error_description": "Invalid Refresh Token: Already Used",
            })
            .to_string(),
        )
        .create_async()
        .await;
    let backend = backend_for(&server);
    backend.set_session(Some(expired_session()));
    let provider = RestIdentityProvider::new(backend.clone());
    let (events, _subscription) = record_events(&provider);

    let err = provider
        .get_session()
        .await
        .expect_err("refresh should be rejected");

    assert!(matches!(err, IdentityProviderError::Rejected(_)));
    assert_eq!(err.to_string(), "Invalid Refresh Token: Already Used");
    assert!(backend.session().is_none());
    assert_eq!(
        *events.lock().expect("events lock"),
        vec![AuthChangeEvent::InitialSession, AuthChangeEvent::SignedOut]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unavailable_auth_service_keeps_session_for_retry() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;
    let backend = backend_for(&server);
    backend.set_session(Some(expired_session()));
    let provider = RestIdentityProvider::new(backend.clone());

    let err = provider
        .get_session()
        .await
        .expect_err("refresh should fail");

    assert!(matches!(err, IdentityProviderError::Transport(_)));
    assert!(backend.session().is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn row_store_refreshes_before_table_request() {
    let mut server = mockito::Server::new_async().await;
    let refresh = mock_refresh(&mut server).await;
    let select = server
        .mock("GET", "/rest/v1/tasks")
        .match_query(Matcher::Any)
        .match_header(
            "authorization",
            format!("Bearer {REFRESHED_TOKEN}").as_str(),
        )
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([task_row("r-1", "After refresh", "todo")]).to_string())
        .create_async()
        .await;
    let backend = backend_for(&server);
    backend.set_session(Some(expired_session()));
    let store = RestTaskRowStore::new(backend);

    let rows = store
        .select_by_owner(&UserId::new(USER_ID))
        .await
        .expect("select should succeed after refresh");

    refresh.assert_async().await;
    select.assert_async().await;
    assert_eq!(rows.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn resumed_board_restores_session_and_loads_tasks() {
    let mut server = mockito::Server::new_async().await;
    let refresh = mock_refresh(&mut server).await;
    let select = server
        .mock("GET", "/rest/v1/tasks")
        .match_query(Matcher::Any)
        .match_header(
            "authorization",
            format!("Bearer {REFRESHED_TOKEN}").as_str(),
        )
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                task_row("r-1", "Persisted", "in-progress"),
                task_row("r-2", "Also persisted", "done"),
            ])
            .to_string(),
        )
        .create_async()
        .await;
    let config = BackendConfig::new(&server.url(), ANON_KEY).expect("valid config");
    let mut board =
        HostedTaskBoard::resume(&config, expired_session()).expect("board should connect");

    board.start().await;

    refresh.assert_async().await;
    select.assert_async().await;
    assert!(board.identity().is_authenticated());
    assert!(!board.identity().is_loading());
    let [todo, in_progress, done] = board.tasks().columns();
    assert_eq!((todo.len(), in_progress.len(), done.len()), (0, 1, 1));
    board.shutdown();
}
