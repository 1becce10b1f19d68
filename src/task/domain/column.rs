//! Status columns derived from the task list.

use super::{Task, TaskStatus};

/// A board column: the tasks whose status matches the column's status.
///
/// Columns are never stored. Build them with [`project_columns`] whenever
/// the task list is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    status: TaskStatus,
    tasks: Vec<Task>,
}

impl Column {
    /// Collects the tasks with the given status, keeping their list order.
    #[must_use]
    pub fn for_status(status: TaskStatus, tasks: &[Task]) -> Self {
        Self {
            status,
            tasks: tasks
                .iter()
                .filter(|task| task.status() == status)
                .cloned()
                .collect(),
        }
    }

    /// Returns the column identifier, which is its status value.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        self.status.as_str()
    }

    /// Returns the column heading.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        self.status.label()
    }

    /// Returns the status this column groups by.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the tasks in this column.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Returns the number of tasks in this column.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` when the column holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Partitions a task list into the `todo`, `in-progress` and `done` columns,
/// in that order.
#[must_use]
pub fn project_columns(tasks: &[Task]) -> [Column; 3] {
    TaskStatus::ALL.map(|status| Column::for_status(status, tasks))
}
