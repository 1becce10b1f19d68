//! Shared client for the hosted backend-as-a-service.
//!
//! The identity and row-store adapters share one [`HostedBackend`] so table
//! requests are made with the signed-in user's access token, and so an
//! expired token is refreshed once for both.

pub(crate) mod auth;
mod client;

pub use client::{BackendError, HostedBackend, ProviderErrorBody};
