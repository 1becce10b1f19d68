//! Task store: the signed-in user's tasks with optimistic local fallback.
//!
//! Every operation has a defined in-memory outcome whether or not the row
//! store answers. Fetch falls back to the demo board, insert falls back to a
//! locally generated task, and update and delete always apply locally.
//! Remote failures are logged and never returned.
//!
//! Local edits applied after a failed remote call are not reconciled; the
//! next successful fetch replaces them with the stored rows.

use std::sync::Arc;

use chrono::TimeDelta;
use mockable::Clock;
use tracing::{debug, warn};

use crate::identity::services::CurrentUser;
use crate::task::{
    domain::{
        Column, Task, TaskDraft, TaskId, TaskPatch, TaskStatus, demo_tasks, project_columns,
    },
    ports::TaskRowStore,
};

/// In-memory task list for the signed-in user, backed by a row store.
pub struct TaskStore<S, C>
where
    S: TaskRowStore,
    C: Clock + Send + Sync,
{
    row_store: Arc<S>,
    clock: Arc<C>,
    current_user: CurrentUser,
    tasks: Vec<Task>,
    loading: bool,
}

impl<S, C> TaskStore<S, C>
where
    S: TaskRowStore,
    C: Clock + Send + Sync,
{
    /// Creates an empty store that scopes its queries to `current_user`.
    #[must_use]
    pub const fn new(row_store: Arc<S>, clock: Arc<C>, current_user: CurrentUser) -> Self {
        Self {
            row_store,
            clock,
            current_user,
            tasks: Vec::new(),
            loading: false,
        }
    }

    /// Loads the signed-in user's tasks, newest first.
    ///
    /// Does nothing when nobody is signed in. When the row store fails the
    /// list is replaced with the demo board instead.
    pub async fn fetch_tasks(&mut self) {
        let Some(owner) = self.current_user.id() else {
            debug!("skipping task fetch without a signed-in user");
            return;
        };

        self.loading = true;
        self.tasks = match self.row_store.select_by_owner(&owner).await {
            Ok(rows) => {
                debug!(user_id = %owner, count = rows.len(), "fetched tasks");
                rows
            }
            Err(err) => {
                warn!(error = %err, user_id = %owner, "task fetch failed; showing demo tasks");
                demo_tasks(&owner)
            }
        };
        self.loading = false;
    }

    /// Creates a task owned by the signed-in user and puts it at the front
    /// of the list.
    ///
    /// Returns `None` without a signed-in user. When the row store fails the
    /// task is kept locally with a time-based identifier.
    pub async fn add_task(&mut self, draft: TaskDraft) -> Option<&Task> {
        let owner = self.current_user.id()?;
        let new_task = draft.owned_by(owner);

        let task = match self.row_store.insert(&new_task).await {
            Ok(stored) => {
                debug!(task_id = %stored.id(), "task stored");
                stored
            }
            Err(err) => {
                let id = self.local_task_id();
                warn!(error = %err, task_id = %id, "task insert failed; keeping it locally");
                Task::from_new(new_task, id, &*self.clock)
            }
        };

        self.tasks.insert(0, task);
        self.tasks.first()
    }

    /// Applies `patch` to the task with identifier `id`.
    ///
    /// The local task is patched and its `updated_at` refreshed whether or
    /// not the row store accepted the change. Unknown identifiers are
    /// ignored.
    pub async fn update_task(&mut self, id: &TaskId, patch: TaskPatch) {
        match self.row_store.update(id, &patch).await {
            Ok(()) => debug!(task_id = %id, status = ?patch.status_change(), "task updated"),
            Err(err) => {
                warn!(error = %err, task_id = %id, "task update failed; applying locally");
            }
        }

        if let Some(task) = self.tasks.iter_mut().find(|task| task.id() == id) {
            task.apply(&patch, &*self.clock);
        }
    }

    /// Removes the task with identifier `id`.
    ///
    /// The local task is removed whether or not the row store accepted the
    /// delete. Unknown identifiers are ignored.
    pub async fn delete_task(&mut self, id: &TaskId) {
        if let Err(err) = self.row_store.delete(id).await {
            warn!(error = %err, task_id = %id, "task delete failed; removing locally");
        }

        if let Some(index) = self.tasks.iter().position(|task| task.id() == id) {
            self.tasks.remove(index);
        }
    }

    /// Moves a task to another column.
    pub async fn move_task(&mut self, id: &TaskId, status: TaskStatus) {
        self.update_task(id, TaskPatch::status(status)).await;
    }

    /// Returns the task list in display order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Returns the task with identifier `id`, if present.
    #[must_use]
    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    /// Projects the current list into the three board columns.
    #[must_use]
    pub fn columns(&self) -> [Column; 3] {
        project_columns(&self.tasks)
    }

    /// Returns `true` while a fetch is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Drops every task, as on sign-out.
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Picks a millisecond timestamp identifier not already in the list.
    fn local_task_id(&self) -> TaskId {
        let now = self.clock.utc();
        (0..)
            .map_while(|offset| now.checked_add_signed(TimeDelta::milliseconds(offset)))
            .map(TaskId::from_timestamp)
            .find(|candidate| self.task(candidate).is_none())
            .unwrap_or_else(TaskId::random)
    }
}
