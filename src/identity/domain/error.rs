//! Error types for identity domain validation.

use thiserror::Error;

/// Errors returned while validating sign-in or sign-up credentials.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialsError {
    /// Email was missing or blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,

    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Error returned while parsing session-change events.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown session change event: {0}")]
pub struct ParseAuthChangeEventError(pub String);
