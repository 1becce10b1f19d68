//! Identity provider port for password authentication and session lookup.

use super::{AuthStateListener, Subscription};
use crate::identity::domain::{Credentials, Session, User};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for identity provider operations.
pub type IdentityProviderResult<T> = Result<T, IdentityProviderError>;

/// External identity provider contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Signs in with email and password and returns the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityProviderError::Rejected`] for unknown accounts or
    /// wrong passwords.
    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> IdentityProviderResult<User>;

    /// Creates an account and returns the new user.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityProviderError::Rejected`] when the account cannot be
    /// created, for example because the email is already registered.
    async fn sign_up(&self, credentials: &Credentials) -> IdentityProviderResult<User>;

    /// Ends the current session.
    ///
    /// # Errors
    ///
    /// Returns an error when the provider could not be told about the
    /// sign-out. Implementations still discard their local session and
    /// notify `SIGNED_OUT` to listeners.
    async fn sign_out(&self) -> IdentityProviderResult<()>;

    /// Returns the session that is currently established, if any.
    ///
    /// # Errors
    ///
    /// Returns an error when the session store cannot be read.
    async fn get_session(&self) -> IdentityProviderResult<Option<Session>>;

    /// Registers a listener for session-change notifications.
    ///
    /// The listener stays registered until the returned handle is dropped.
    fn on_auth_state_change(&self, listener: AuthStateListener) -> Subscription;
}

/// Errors returned by identity provider implementations.
#[derive(Debug, Clone, Error)]
pub enum IdentityProviderError {
    /// The provider refused the request; the message is meant for users.
    #[error("{0}")]
    Rejected(String),

    /// The provider answered with something that could not be understood.
    #[error("unexpected identity provider response: {0}")]
    Decode(String),

    /// The provider could not be reached.
    #[error("identity provider unavailable: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl IdentityProviderError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }

    /// Creates a rejection with a user-facing message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}
