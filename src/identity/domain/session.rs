//! Provider sessions and the events that announce session changes.

use super::{ParseAuthChangeEventError, User};
use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;
use zeroize::Zeroizing;

/// How long before its expiry an access token is treated as expired.
const EXPIRY_MARGIN: TimeDelta = TimeDelta::seconds(30);

/// An authenticated provider session.
///
/// A session may carry a refresh token and the expiry of its access token.
/// Sessions persisted by an earlier run are rebuilt with [`Session::new`]
/// and the `with_*` builders.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    access_token: Zeroizing<String>,
    refresh_token: Option<Zeroizing<String>>,
    expires_at: Option<DateTime<Utc>>,
    user: User,
}

impl Session {
    /// Creates a session for `user` authorized by `access_token`.
    ///
    /// The session has no refresh token and never expires until one is
    /// attached.
    #[must_use]
    pub fn new(access_token: impl Into<String>, user: User) -> Self {
        Self {
            access_token: Zeroizing::new(access_token.into()),
            refresh_token: None,
            expires_at: None,
            user,
        }
    }

    /// Attaches the token used to obtain a new access token.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(Zeroizing::new(refresh_token.into()));
        self
    }

    /// Sets the instant the access token stops being accepted.
    #[must_use]
    pub const fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Bearer token presented to the hosted backend.
    #[must_use]
    pub fn access_token(&self) -> &str {
        self.access_token.as_str()
    }

    /// Token exchanged for a new access token, if the provider issued one.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_ref().map(|token| token.as_str())
    }

    /// Expiry of the access token, if known.
    #[must_use]
    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns `true` when the access token has expired at `now`, or will
    /// within a short margin.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|expires_at| now + EXPIRY_MARGIN >= expires_at)
    }

    /// User the session belongs to.
    #[must_use]
    pub const fn user(&self) -> &User {
        &self.user
    }

    /// Consumes the session and returns its user.
    #[must_use]
    pub fn into_user(self) -> User {
        self.user
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

/// Session-change notification kinds pushed by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthChangeEvent {
    /// Delivered once to a new subscriber with the current session.
    InitialSession,
    /// A user signed in.
    SignedIn,
    /// The user signed out.
    SignedOut,
    /// The access token was refreshed.
    TokenRefreshed,
    /// The user's profile changed.
    UserUpdated,
    /// A password recovery link was followed.
    PasswordRecovery,
}

impl AuthChangeEvent {
    /// Returns the provider's wire name for the event.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InitialSession => "INITIAL_SESSION",
            Self::SignedIn => "SIGNED_IN",
            Self::SignedOut => "SIGNED_OUT",
            Self::TokenRefreshed => "TOKEN_REFRESHED",
            Self::UserUpdated => "USER_UPDATED",
            Self::PasswordRecovery => "PASSWORD_RECOVERY",
        }
    }
}

impl fmt::Display for AuthChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AuthChangeEvent {
    type Error = ParseAuthChangeEventError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "INITIAL_SESSION" => Ok(Self::InitialSession),
            "SIGNED_IN" => Ok(Self::SignedIn),
            "SIGNED_OUT" => Ok(Self::SignedOut),
            "TOKEN_REFRESHED" => Ok(Self::TokenRefreshed),
            "USER_UPDATED" => Ok(Self::UserUpdated),
            "PASSWORD_RECOVERY" => Ok(Self::PasswordRecovery),
            _ => Err(ParseAuthChangeEventError(value.to_owned())),
        }
    }
}
