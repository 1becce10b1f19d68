//! Unit tests for user identity.


use crate::identity::domain::{Credentials, User, UserId};

pub(super) fn alice() -> User {
    User::new(UserId::new("user-alice"), "alice@example.com")
}

pub(super) fn credentials(email: &str, password: &str) -> Credentials {
    Credentials::try_from_parts(email, password).expect("valid credentials")
}
