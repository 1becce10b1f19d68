//! Taskboard: a Kanban-style task tracker.
//!
//! Users sign in against a hosted identity provider and manage their tasks on
//! a three-column board (`todo`, `in-progress`, `done`). Tasks are stored in
//! an external row store; when it cannot be reached the board keeps working
//! on local state.
//!
//! # Architecture
//!
//! Taskboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (HTTP, in-memory)
//! - **Services**: Stateful orchestration over the ports
//!
//! # Modules
//!
//! - [`identity`]: Sign-in state mirrored from the identity provider
//! - [`task`]: Task list, optimistic mutations and column projection
//! - [`app`]: Application context that owns both for one board
//! - [`config`]: Backend endpoint and key resolution
//! - [`backend`]: Shared HTTP client for the hosted backend

pub mod app;
pub mod backend;
pub mod config;
pub mod identity;
pub mod task;
