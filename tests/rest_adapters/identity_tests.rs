//! Identity adapter tests against the mocked auth service.

use std::sync::{Arc, Mutex};

use super::helpers::{
    ACCESS_TOKEN, ANON_KEY, USER_ID, backend_for, credentials, session_body, signed_in_backend,
};
use mockito::Matcher;
use rstest::rstest;
use serde_json::json;
use taskboard::identity::{
    adapters::rest::RestIdentityProvider,
    domain::{AuthChangeEvent, Session},
    ports::{IdentityProvider, IdentityProviderError},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn password_sign_in_establishes_session() {
    let mut server = mockito::Server::new_async().await;
    let token = server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::UrlEncoded("grant_type".into(), "password".into()))
        .match_header("apikey", ANON_KEY)
        .match_body(Matcher::Json(json!({
            "email": "ada@example.com",
            "password": "analytical-engine",
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(session_body().to_string())
        .create_async()
        .await;
    let backend = backend_for(&server);
    let provider = RestIdentityProvider::new(backend.clone());

    let user = provider
        .sign_in_with_password(&credentials())
        .await
        .expect("sign-in should succeed");

    token.assert_async().await;
    assert_eq!(user.id().as_str(), USER_ID);
    assert_eq!(user.display_name(), Some("Ada"));
    let session = provider
        .get_session()
        .await
        .expect("session lookup")
        .expect("session should be held");
    assert_eq!(session.access_token(), ACCESS_TOKEN);
    assert!(backend.session().is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_sign_in_surfaces_provider_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials",
            })
            .to_string(),
        )
        .create_async()
        .await;
    let provider = RestIdentityProvider::new(backend_for(&server));

    let err = provider
        .sign_in_with_password(&credentials())
        .await
        .expect_err("sign-in should be rejected");

    assert!(matches!(err, IdentityProviderError::Rejected(_)));
    assert_eq!(err.to_string(), "Invalid login credentials");
    assert!(provider.get_session().await.expect("lookup").is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn error_without_body_uses_status_reason() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth/v1/signup")
        .with_status(429)
        .create_async()
        .await;
    let provider = RestIdentityProvider::new(backend_for(&server));

    let err = provider
        .sign_up(&credentials())
        .await
        .expect_err("sign-up should be rejected");

    assert_eq!(err.to_string(), "Too Many Requests");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sign_up_pending_confirmation_returns_user_without_session() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth/v1/signup")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "id": USER_ID, "email": "ada@example.com" }).to_string())
        .create_async()
        .await;
    let provider = RestIdentityProvider::new(backend_for(&server));

    let user = provider
        .sign_up(&credentials())
        .await
        .expect("sign-up should succeed");

    assert_eq!(user.email(), "ada@example.com");
    assert!(user.display_name().is_none());
    assert!(provider.get_session().await.expect("lookup").is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sign_up_with_session_signs_in() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth/v1/signup")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(session_body().to_string())
        .create_async()
        .await;
    let provider = RestIdentityProvider::new(backend_for(&server));

    provider
        .sign_up(&credentials())
        .await
        .expect("sign-up should succeed");

    assert!(provider.get_session().await.expect("lookup").is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_response_is_a_decode_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;
    let provider = RestIdentityProvider::new(backend_for(&server));

    let err = provider
        .sign_in_with_password(&credentials())
        .await
        .expect_err("garbage should not decode");

    assert!(matches!(err, IdentityProviderError::Decode(_)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sign_out_revokes_token_and_notifies() {
    let mut server = mockito::Server::new_async().await;
    let logout = server
        .mock("POST", "/auth/v1/logout")
        .match_header("authorization", format!("Bearer {ACCESS_TOKEN}").as_str())
        .with_status(204)
        .create_async()
        .await;
    let backend = signed_in_backend(&server);
    let provider = RestIdentityProvider::new(backend.clone());
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let _subscription = provider.on_auth_state_change(Arc::new(
        move |event: AuthChangeEvent, _session: Option<Session>| {
            sink.lock().expect("events lock").push(event);
        },
    ));

    provider.sign_out().await.expect("sign-out should succeed");

    logout.assert_async().await;
    assert!(backend.session().is_none());
    let seen = events.lock().expect("events lock").clone();
    assert_eq!(
        seen,
        [AuthChangeEvent::InitialSession, AuthChangeEvent::SignedOut]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_sign_out_still_drops_local_session_and_notifies() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth/v1/logout")
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(json!({ "msg": "upstream unavailable" }).to_string())
        .create_async()
        .await;
    let backend = signed_in_backend(&server);
    let provider = RestIdentityProvider::new(backend.clone());
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let _subscription = provider.on_auth_state_change(Arc::new(
        move |event: AuthChangeEvent, _session: Option<Session>| {
            sink.lock().expect("events lock").push(event);
        },
    ));

    let err = provider
        .sign_out()
        .await
        .expect_err("sign-out should report the failure");

    assert_eq!(err.to_string(), "upstream unavailable");
    assert!(backend.session().is_none());
    assert_eq!(
        *events.lock().expect("events lock"),
        [AuthChangeEvent::InitialSession, AuthChangeEvent::SignedOut]
    );
}
