//! User identity for the task board.
//!
//! Wraps an external identity provider: password sign-in and sign-up,
//! sign-out, and restoration of an existing session with push-based
//! session-change notifications. The signed-in user is published through a
//! shared [`services::CurrentUser`] handle that the task store reads. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
