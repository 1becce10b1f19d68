//! Task board for the signed-in user.
//!
//! Keeps the user's tasks in memory, mirrors create, update and delete
//! operations to an external row store, and derives the `todo`,
//! `in-progress` and `done` columns from the list. Local state is updated
//! even when the row store cannot be reached. The module follows hexagonal
//! architecture:
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
