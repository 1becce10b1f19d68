//! Row-store port for the `tasks` table.

use crate::identity::domain::UserId;
use crate::task::domain::{NewTask, Task, TaskId, TaskPatch};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for row-store operations.
pub type RowStoreResult<T> = Result<T, RowStoreError>;

/// Task table persistence contract.
///
/// Update and delete are filtered operations: a filter matching no row is
/// not an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRowStore: Send + Sync {
    /// Returns every task owned by `owner`, newest-created first.
    ///
    /// # Errors
    ///
    /// Returns [`RowStoreError`] when the store cannot be queried.
    async fn select_by_owner(&self, owner: &UserId) -> RowStoreResult<Vec<Task>>;

    /// Inserts a row and returns it as stored, with its assigned identifier
    /// and timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`RowStoreError`] when the row is rejected or the store cannot
    /// be reached.
    async fn insert(&self, task: &NewTask) -> RowStoreResult<Task>;

    /// Applies `patch` to the row with identifier `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RowStoreError`] when the update is rejected or the store
    /// cannot be reached.
    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> RowStoreResult<()>;

    /// Deletes the row with identifier `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RowStoreError`] when the delete is rejected or the store
    /// cannot be reached.
    async fn delete(&self, id: &TaskId) -> RowStoreResult<()>;
}

/// Errors returned by row-store implementations.
#[derive(Debug, Clone, Error)]
pub enum RowStoreError {
    /// The store refused the request.
    #[error("row store rejected the request ({status}): {message}")]
    Rejected {
        /// HTTP-style status code reported by the store.
        status: u16,
        /// Message reported by the store.
        message: String,
    },

    /// An insert returned no row.
    #[error("row store returned no row for the insert")]
    MissingRow,

    /// A row could not be decoded into a task.
    #[error("malformed task row: {0}")]
    Decode(String),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl RowStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
