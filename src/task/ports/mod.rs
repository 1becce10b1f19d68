//! Port contracts for the task board.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod row_store;

#[cfg(test)]
pub use row_store::MockTaskRowStore;
pub use row_store::{RowStoreError, RowStoreResult, TaskRowStore};
