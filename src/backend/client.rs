//! Reqwest-backed hosted backend client.
//!
//! Owns transport details shared by every adapter: the base URL, the API key
//! headers, the request timeout and the session token used as bearer. The
//! session is refreshed here, before it is handed out, once its access token
//! is close to expiry.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;
use zeroize::Zeroizing;

use super::auth::{RefreshBody, SessionDto, TOKEN_PATH};
use crate::config::BackendConfig;
use crate::identity::domain::{AuthChangeEvent, Session};
use crate::identity::ports::ListenerRegistry;

/// Errors raised while building backend requests.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// A service path could not be joined onto the base URL.
    #[error("invalid backend endpoint '{path}': {source}")]
    Endpoint {
        /// Service path that failed to join.
        path: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },

    /// A request could not be sent or its body could not be read.
    #[error("backend request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Provider message, or the status reason when the body had none.
        message: String,
    },

    /// A success body did not have the expected shape.
    #[error("unexpected backend response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Builds a rejection from a non-success status and its body.
    #[must_use]
    pub fn from_status(status: StatusCode, body: &[u8]) -> Self {
        let message = ProviderErrorBody::parse(body).into_message().unwrap_or_else(|| {
            status
                .canonical_reason()
                .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_owned)
        });
        Self::Rejected {
            status: status.as_u16(),
            message,
        }
    }

    /// Returns `true` for a 4xx answer, which retrying cannot fix.
    #[must_use]
    pub const fn is_client_rejection(&self) -> bool {
        matches!(self, Self::Rejected { status, .. } if *status >= 400 && *status < 500)
    }
}

/// Handle on the hosted backend shared between adapters.
#[derive(Clone)]
pub struct HostedBackend {
    inner: Arc<BackendInner>,
}

struct BackendInner {
    client: Client,
    base_url: Url,
    anon_key: Zeroizing<String>,
    session: RwLock<Option<Session>>,
    listeners: ListenerRegistry,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl HostedBackend {
    /// Builds a client from resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Client`] when the reqwest client cannot be
    /// constructed.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        Self::with_clock(config, Arc::new(DefaultClock))
    }

    /// Builds a client that judges token expiry against `clock`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Client`] when the reqwest client cannot be
    /// constructed.
    pub fn with_clock(
        config: &BackendConfig,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            inner: Arc::new(BackendInner {
                client,
                base_url: config.url().clone(),
                anon_key: Zeroizing::new(config.anon_key().to_owned()),
                session: RwLock::new(None),
                listeners: ListenerRegistry::new(),
                clock,
            }),
        })
    }

    /// Returns the underlying HTTP client.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.inner.client
    }

    /// Resolves a service path such as `auth/v1/signup` against the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Endpoint`] when the path cannot be joined.
    pub fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.inner
            .base_url
            .join(path)
            .map_err(|source| BackendError::Endpoint {
                path: path.to_owned(),
                source,
            })
    }

    /// Adds the API key and bearer headers to a request.
    ///
    /// The bearer is the session's access token when signed in, otherwise
    /// the anonymous key.
    #[must_use]
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self.session().map_or_else(
            || self.anon_key().to_owned(),
            |session| session.access_token().to_owned(),
        );
        request.header("apikey", self.anon_key()).bearer_auth(bearer)
    }

    /// Returns the anonymous API key.
    #[must_use]
    pub fn anon_key(&self) -> &str {
        self.inner.anon_key.as_str()
    }

    /// Returns the locally held session, if any.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.inner
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the locally held session.
    ///
    /// Seeding a persisted session here lets a new process resume it.
    pub fn set_session(&self, session: Option<Session>) {
        *self
            .inner
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner) = session;
    }

    /// Returns the session-change listeners shared by the adapters.
    #[must_use]
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.inner.listeners
    }

    /// Returns the current time as seen by the backend's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.inner.clock.utc()
    }

    /// Returns a usable session, refreshing it first when it has expired.
    ///
    /// An expired session without a refresh token, or one whose refresh token
    /// the auth service refuses with a 4xx status, is dropped and
    /// `SIGNED_OUT` is emitted.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Rejected`] when the refresh was refused, and
    /// transport or decode errors when it could not complete. Only a 4xx
    /// refusal drops the session; other failures keep it for a later retry.
    pub async fn current_session(&self) -> Result<Option<Session>, BackendError> {
        let Some(session) = self.session() else {
            return Ok(None);
        };
        if !session.is_expired_at(self.now()) {
            return Ok(Some(session));
        }
        let Some(refresh_token) = session.refresh_token() else {
            warn!(user_id = %session.user().id(), "session expired without refresh token");
            self.drop_session();
            return Ok(None);
        };

        match self.refresh_session(refresh_token).await {
            Ok(refreshed) => Ok(Some(refreshed)),
            Err(err) if err.is_client_rejection() => {
                warn!(error = %err, "refresh token rejected; signing out");
                self.drop_session();
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Exchanges `refresh_token` for a new session and stores it.
    ///
    /// Emits `TOKEN_REFRESHED` on success.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the request fails, is rejected, or
    /// answers with an unexpected body.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session, BackendError> {
        let url = self.endpoint(TOKEN_PATH)?;
        let response = self
            .client()
            .post(url)
            .header("apikey", self.anon_key())
            .bearer_auth(self.anon_key())
            .query(&[("grant_type", "refresh_token")])
            .json(&RefreshBody { refresh_token })
            .send()
            .await
            .map_err(BackendError::Request)?;

        let status = response.status();
        let body = response.bytes().await.map_err(BackendError::Request)?;
        if !status.is_success() {
            return Err(BackendError::from_status(status, body.as_ref()));
        }
        let session = serde_json::from_slice::<SessionDto>(&body)
            .map_err(|err| BackendError::Decode(err.to_string()))?
            .into_domain(self.now());

        debug!(user_id = %session.user().id(), "session refreshed");
        self.set_session(Some(session.clone()));
        self.inner
            .listeners
            .notify(AuthChangeEvent::TokenRefreshed, Some(&session));
        Ok(session)
    }

    fn drop_session(&self) {
        self.set_session(None);
        self.inner.listeners.notify(AuthChangeEvent::SignedOut, None);
    }
}

impl fmt::Debug for HostedBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostedBackend")
            .field("base_url", &self.inner.base_url.as_str())
            .field("signed_in", &self.session().is_some())
            .finish_non_exhaustive()
    }
}

/// Error payload returned by the hosted backend's services.
///
/// The auth service uses `error_description` or `msg`; the table service
/// uses `message`.
#[derive(Debug, Default, Deserialize)]
pub struct ProviderErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl ProviderErrorBody {
    /// Decodes an error body, falling back to an empty body when it is not
    /// JSON.
    #[must_use]
    pub fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// Returns the most specific message in the body, if any.
    #[must_use]
    pub fn into_message(self) -> Option<String> {
        [self.error_description, self.msg, self.message, self.error]
            .into_iter()
            .flatten()
            .find(|message| !message.trim().is_empty())
    }
}
