//! In-memory row store for task board tests and offline demos.

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::identity::domain::UserId;
use crate::task::{
    domain::{NewTask, Task, TaskId, TaskPatch},
    ports::{RowStoreError, RowStoreResult, TaskRowStore},
};

/// Thread-safe in-memory `tasks` table.
///
/// Rows get random identifiers and clock timestamps on insert. The store can
/// be switched offline to exercise the task store's fallback paths.
pub struct InMemoryTaskRowStore<C = DefaultClock>
where
    C: Clock + Send + Sync,
{
    state: Arc<RwLock<InMemoryTaskState>>,
    clock: Arc<C>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    rows: Vec<Task>,
    offline: bool,
}

impl InMemoryTaskRowStore<DefaultClock> {
    /// Creates an empty store stamped by the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }
}

impl Default for InMemoryTaskRowStore<DefaultClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for InMemoryTaskRowStore<C>
where
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C> InMemoryTaskRowStore<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty store stamped by `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<C>) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryTaskState::default())),
            clock,
        }
    }

    /// Stores `task` as-is, bypassing insert-time stamping.
    ///
    /// # Errors
    ///
    /// Returns [`RowStoreError::Persistence`] when the state lock is poisoned.
    pub fn seed(&self, task: Task) -> RowStoreResult<()> {
        self.write_state()?.rows.push(task);
        Ok(())
    }

    /// Returns a snapshot of every stored row in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`RowStoreError::Persistence`] when the state lock is poisoned.
    pub fn rows(&self) -> RowStoreResult<Vec<Task>> {
        Ok(self.read_state()?.rows.clone())
    }

    /// Switches the store offline (every call fails) or back online.
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut state) = self.write_state() {
            state.offline = offline;
        }
    }

    fn read_state(&self) -> RowStoreResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| poisoned(&err))
    }

    fn write_state(&self) -> RowStoreResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| poisoned(&err))
    }

    fn online_write_state(&self) -> RowStoreResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        let state = self.write_state()?;
        if state.offline {
            return Err(offline_error());
        }
        Ok(state)
    }
}

fn poisoned(err: &impl ToString) -> RowStoreError {
    RowStoreError::persistence(std::io::Error::other(err.to_string()))
}

fn offline_error() -> RowStoreError {
    RowStoreError::persistence(std::io::Error::new(
        std::io::ErrorKind::NotConnected,
        "row store is offline",
    ))
}

#[async_trait]
impl<C> TaskRowStore for InMemoryTaskRowStore<C>
where
    C: Clock + Send + Sync,
{
    async fn select_by_owner(&self, owner: &UserId) -> RowStoreResult<Vec<Task>> {
        let state = self.read_state()?;
        if state.offline {
            return Err(offline_error());
        }
        // Later inserts come first among rows created in the same instant.
        let mut rows: Vec<Task> = state
            .rows
            .iter()
            .rev()
            .filter(|task| task.created_by() == owner)
            .cloned()
            .collect();
        rows.sort_by(|left, right| right.created_at().cmp(&left.created_at()));
        Ok(rows)
    }

    async fn insert(&self, task: &NewTask) -> RowStoreResult<Task> {
        let mut state = self.online_write_state()?;
        let stored = Task::from_new(task.clone(), TaskId::random(), &*self.clock);
        state.rows.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> RowStoreResult<()> {
        let mut state = self.online_write_state()?;
        if let Some(row) = state.rows.iter_mut().find(|task| task.id() == id) {
            row.apply(patch, &*self.clock);
        }
        Ok(())
    }

    async fn delete(&self, id: &TaskId) -> RowStoreResult<()> {
        let mut state = self.online_write_state()?;
        state.rows.retain(|task| task.id() != id);
        Ok(())
    }
}
