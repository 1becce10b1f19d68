//! Identity session: sign-in state mirrored from the identity provider.

use super::CurrentUser;
use crate::identity::{
    domain::{AuthChangeEvent, Credentials, CredentialsError, Session, User},
    ports::{AuthStateListener, IdentityProvider, IdentityProviderError, Subscription},
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{debug, error, warn};

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";
const LOGOUT_FAILED: &str = "Logout failed";

/// Service-level errors for identity session operations.
#[derive(Debug, Error)]
pub enum IdentitySessionError {
    /// Credentials were rejected before reaching the provider.
    #[error(transparent)]
    Credentials(#[from] CredentialsError),
    /// The provider call failed.
    #[error(transparent)]
    Provider(#[from] IdentityProviderError),
}

/// Result type for identity session operations.
pub type IdentitySessionResult<T> = Result<T, IdentitySessionError>;

#[derive(Debug, Clone, Copy)]
enum AuthFlow {
    SignIn,
    SignUp,
}

impl AuthFlow {
    const fn failure_message(self) -> &'static str {
        match self {
            Self::SignIn => LOGIN_FAILED,
            Self::SignUp => REGISTRATION_FAILED,
        }
    }
}

/// Sign-in state for one application instance.
///
/// Every successful operation writes the shared [`CurrentUser`]; failures
/// are kept as a human-readable message in [`IdentitySession::error`].
pub struct IdentitySession<P>
where
    P: IdentityProvider,
{
    provider: Arc<P>,
    current_user: CurrentUser,
    loading: Arc<AtomicBool>,
    error: Option<String>,
    subscription: Option<Subscription>,
}

impl<P> IdentitySession<P>
where
    P: IdentityProvider,
{
    /// Creates a session that writes to `current_user`.
    ///
    /// The session reports loading until [`Self::restore_session`] or an
    /// explicit sign-in finishes.
    #[must_use]
    pub fn new(provider: Arc<P>, current_user: CurrentUser) -> Self {
        Self {
            provider,
            current_user,
            loading: Arc::new(AtomicBool::new(true)),
            error: None,
            subscription: None,
        }
    }

    /// Signs in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`IdentitySessionError`] when the credentials are invalid or
    /// the provider refuses them. The message is also kept in
    /// [`Self::error`] and the current user is left untouched.
    pub async fn login(&mut self, email: &str, password: &str) -> IdentitySessionResult<User> {
        self.authenticate(AuthFlow::SignIn, email, password).await
    }

    /// Creates an account and signs in as the new user.
    ///
    /// # Errors
    ///
    /// Returns [`IdentitySessionError`] when the credentials are invalid or
    /// the provider cannot create the account.
    pub async fn register(&mut self, email: &str, password: &str) -> IdentitySessionResult<User> {
        self.authenticate(AuthFlow::SignUp, email, password).await
    }

    /// Signs out.
    ///
    /// The current user is cleared even when the provider call fails.
    ///
    /// # Errors
    ///
    /// Returns [`IdentitySessionError::Provider`] when the provider reported
    /// a failure; the message is also kept in [`Self::error`].
    pub async fn logout(&mut self) -> IdentitySessionResult<()> {
        let result = self.provider.sign_out().await;
        self.current_user.clear();
        match result {
            Ok(()) => {
                debug!("signed out");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "sign-out failed at the provider; local session cleared");
                self.record_error(&err, LOGOUT_FAILED);
                Err(err.into())
            }
        }
    }

    /// Restores an existing provider session and follows later session
    /// changes until [`Self::shutdown`].
    ///
    /// Failures are logged and otherwise ignored so startup can continue.
    pub async fn restore_session(&mut self) {
        match self.provider.get_session().await {
            Ok(session) => {
                debug!(restored = session.is_some(), "session restored");
                self.current_user.set(session.map(Session::into_user));
            }
            Err(err) => {
                error!(error = %err, "session restoration failed");
            }
        }

        if self.subscription.is_none() {
            let listener = self.session_listener();
            self.subscription = Some(self.provider.on_auth_state_change(listener));
        }
        self.loading.store(false, Ordering::SeqCst);
    }

    /// Stops following provider session changes.
    pub fn shutdown(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }

    /// Returns the signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.current_user.get()
    }

    /// Returns the shared current-user handle.
    #[must_use]
    pub const fn current_user_handle(&self) -> &CurrentUser {
        &self.current_user
    }

    /// Returns `true` when a user is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_authenticated()
    }

    /// Returns `true` while a sign-in, sign-up or restoration is pending.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Returns the message from the last failed operation, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns `true` while provider session changes are being followed.
    #[must_use]
    pub const fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    async fn authenticate(
        &mut self,
        flow: AuthFlow,
        email: &str,
        password: &str,
    ) -> IdentitySessionResult<User> {
        self.error = None;
        self.loading.store(true, Ordering::SeqCst);
        let result = self.call_provider(flow, email, password).await;
        self.loading.store(false, Ordering::SeqCst);

        match result {
            Ok(user) => {
                debug!(user_id = %user.id(), ?flow, "authenticated");
                self.current_user.set(Some(user.clone()));
                Ok(user)
            }
            Err(err) => {
                debug!(error = %err, ?flow, "authentication failed");
                self.record_error(&err, flow.failure_message());
                Err(err)
            }
        }
    }

    async fn call_provider(
        &self,
        flow: AuthFlow,
        email: &str,
        password: &str,
    ) -> IdentitySessionResult<User> {
        let credentials = Credentials::try_from_parts(email, password)?;
        let user = match flow {
            AuthFlow::SignIn => self.provider.sign_in_with_password(&credentials).await?,
            AuthFlow::SignUp => self.provider.sign_up(&credentials).await?,
        };
        Ok(user)
    }

    fn record_error(&mut self, err: &dyn std::error::Error, fallback: &str) {
        let message = err.to_string();
        self.error = Some(if message.trim().is_empty() {
            fallback.to_owned()
        } else {
            message
        });
    }

    fn session_listener(&self) -> AuthStateListener {
        let current_user = self.current_user.clone();
        let loading = Arc::clone(&self.loading);
        Arc::new(move |event: AuthChangeEvent, session: Option<Session>| {
            debug!(%event, signed_in = session.is_some(), "session changed");
            current_user.set(session.map(Session::into_user));
            loading.store(false, Ordering::SeqCst);
        })
    }
}
