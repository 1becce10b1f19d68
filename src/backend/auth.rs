//! Wire shapes of the hosted auth service.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::domain::{Session, User, UserId};

pub(crate) const TOKEN_PATH: &str = "auth/v1/token";
pub(crate) const SIGNUP_PATH: &str = "auth/v1/signup";
pub(crate) const LOGOUT_PATH: &str = "auth/v1/logout";

#[derive(Debug, Deserialize)]
pub(crate) struct UserDto {
    pub(crate) id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<UserMetadataDto>,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadataDto {
    #[serde(rename = "displayName")]
    display_name: Option<String>,
}

/// Session issued by the password and refresh-token grants.
///
/// The provider reports expiry as `expires_at` (Unix seconds), as
/// `expires_in` (seconds from now), or both.
#[derive(Debug, Deserialize)]
pub(crate) struct SessionDto {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: UserDto,
}

#[derive(Serialize)]
pub(crate) struct RefreshBody<'a> {
    pub(crate) refresh_token: &'a str,
}

impl UserDto {
    pub(crate) fn into_domain(self) -> User {
        let user = User::new(UserId::new(self.id), self.email.unwrap_or_default());
        match self.user_metadata.and_then(|metadata| metadata.display_name) {
            Some(display_name) => user.with_display_name(display_name),
            None => user,
        }
    }
}

impl SessionDto {
    /// Builds the domain session, resolving a relative expiry against `now`.
    pub(crate) fn into_domain(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|seconds| DateTime::<Utc>::from_timestamp(seconds, 0))
            .or_else(|| {
                self.expires_in
                    .and_then(|seconds| now.checked_add_signed(TimeDelta::seconds(seconds)))
            });
        let mut session = Session::new(self.access_token, self.user.into_domain());
        if let Some(refresh_token) = self.refresh_token {
            session = session.with_refresh_token(refresh_token);
        }
        if let Some(at) = expires_at {
            session = session.with_expires_at(at);
        }
        session
    }
}
