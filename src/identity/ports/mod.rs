//! Port contracts for user identity.
//!
//! Ports define infrastructure-agnostic interfaces used by identity services.

pub mod listener;
pub mod provider;

pub use listener::{AuthStateListener, ListenerRegistry, Subscription};
#[cfg(test)]
pub use provider::MockIdentityProvider;
pub use provider::{IdentityProvider, IdentityProviderError, IdentityProviderResult};
