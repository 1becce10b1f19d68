//! Domain model for user identity.
//!
//! Users, credentials, provider sessions and session-change events. The
//! identity provider itself is reached only through the
//! [`crate::identity::ports`] contract.

mod credentials;
mod error;
mod session;
mod user;

pub use credentials::Credentials;
pub use error::{CredentialsError, ParseAuthChangeEventError};
pub use session::{AuthChangeEvent, Session};
pub use user::{User, UserId};
