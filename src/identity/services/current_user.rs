//! Shared handle on the signed-in user.

use crate::identity::domain::{User, UserId};
use std::sync::{Arc, PoisonError, RwLock};

/// Shared, cloneable view of the signed-in user.
///
/// The identity session writes it; the task store reads it to scope row
/// store queries. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser {
    state: Arc<RwLock<Option<User>>>,
}

impl CurrentUser {
    /// Creates a handle with nobody signed in.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the signed-in user, if any.
    #[must_use]
    pub fn get(&self) -> Option<User> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the signed-in user's identifier, if any.
    #[must_use]
    pub fn id(&self) -> Option<UserId> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|user| user.id().clone())
    }

    /// Replaces the signed-in user.
    pub fn set(&self, user: Option<User>) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = user;
    }

    /// Clears the signed-in user.
    pub fn clear(&self) {
        self.set(None);
    }

    /// Returns `true` when a user is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
