//! Identity provider adapter for the hosted backend's auth service.
//!
//! Speaks the `/auth/v1` password-grant API. The session returned by sign-in
//! is held on the shared [`HostedBackend`] so row-store requests run as the
//! signed-in user. Listeners are the backend's, so token refreshes made on
//! behalf of the row store reach them too.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::{
    BackendError, HostedBackend,
    auth::{LOGOUT_PATH, SIGNUP_PATH, SessionDto, TOKEN_PATH, UserDto},
};
use crate::identity::{
    domain::{AuthChangeEvent, Credentials, Session, User},
    ports::{
        AuthStateListener, IdentityProvider, IdentityProviderError, IdentityProviderResult,
        Subscription,
    },
};

/// Identity provider backed by the hosted auth service.
#[derive(Debug, Clone)]
pub struct RestIdentityProvider {
    backend: HostedBackend,
}

impl RestIdentityProvider {
    /// Creates an adapter sharing `backend` with the other adapters.
    #[must_use]
    pub const fn new(backend: HostedBackend) -> Self {
        Self { backend }
    }

    async fn post<B>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> IdentityProviderResult<Vec<u8>>
    where
        B: Serialize + Sync,
    {
        let url = self
            .backend
            .endpoint(path)
            .map_err(IdentityProviderError::transport)?;
        let response = self
            .backend
            .authorize(self.backend.client().post(url))
            .query(query)
            .json(body)
            .send()
            .await
            .map_err(IdentityProviderError::transport)?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(IdentityProviderError::transport)?;
        if !status.is_success() {
            return Err(map_backend_error(BackendError::from_status(
                status,
                bytes.as_ref(),
            )));
        }
        Ok(bytes.to_vec())
    }

    fn establish(&self, dto: SessionDto) -> User {
        let session = dto.into_domain(self.backend.now());
        self.backend.set_session(Some(session.clone()));
        self.backend
            .listeners()
            .notify(AuthChangeEvent::SignedIn, Some(&session));
        session.into_user()
    }
}

#[derive(Serialize)]
struct PasswordBody<'a> {
    email: &'a str,
    password: &'a str,
}

impl<'a> From<&'a Credentials> for PasswordBody<'a> {
    fn from(credentials: &'a Credentials) -> Self {
        Self {
            email: credentials.email(),
            password: credentials.password(),
        }
    }
}

/// Sign-up answers with a session, or with a bare user while email
/// confirmation is pending.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpDto {
    Session(SessionDto),
    User(UserDto),
}

fn decode<T>(body: &[u8]) -> IdentityProviderResult<T>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_slice(body).map_err(|err| IdentityProviderError::Decode(err.to_string()))
}

fn map_backend_error(err: BackendError) -> IdentityProviderError {
    match err {
        BackendError::Rejected { message, .. } => IdentityProviderError::rejected(message),
        BackendError::Decode(message) => IdentityProviderError::Decode(message),
        other => IdentityProviderError::transport(other),
    }
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> IdentityProviderResult<User> {
        let body = self
            .post(
                TOKEN_PATH,
                &[("grant_type", "password")],
                &PasswordBody::from(credentials),
            )
            .await?;
        let session = decode::<SessionDto>(&body)?;
        Ok(self.establish(session))
    }

    async fn sign_up(&self, credentials: &Credentials) -> IdentityProviderResult<User> {
        let body = self
            .post(SIGNUP_PATH, &[], &PasswordBody::from(credentials))
            .await?;
        match decode::<SignUpDto>(&body)? {
            SignUpDto::Session(session) => Ok(self.establish(session)),
            SignUpDto::User(user) => {
                debug!(user_id = %user.id, "account created; awaiting email confirmation");
                Ok(user.into_domain())
            }
        }
    }

    async fn sign_out(&self) -> IdentityProviderResult<()> {
        let outcome = if self.backend.session().is_some() {
            self.post(LOGOUT_PATH, &[], &serde_json::json!({}))
                .await
                .map(|_| ())
        } else {
            Ok(())
        };
        self.backend.set_session(None);
        self.backend
            .listeners()
            .notify(AuthChangeEvent::SignedOut, None);
        outcome
    }

    async fn get_session(&self) -> IdentityProviderResult<Option<Session>> {
        self.backend
            .current_session()
            .await
            .map_err(map_backend_error)
    }

    fn on_auth_state_change(&self, listener: AuthStateListener) -> Subscription {
        listener(AuthChangeEvent::InitialSession, self.backend.session());
        self.backend.listeners().subscribe(listener)
    }
}
