//! Domain model for the task board.
//!
//! Tasks, their board status and priority, the payloads used to create and
//! patch them, and the column projection. Infrastructure concerns stay
//! outside the domain boundary.

mod column;
mod demo;
mod error;
mod ids;
mod status;
mod task;

pub use column::{Column, project_columns};
pub use demo::demo_tasks;
pub use error::{ParseTaskPriorityError, ParseTaskStatusError, TaskDomainError};
pub use ids::{TaskId, TaskTitle};
pub use status::{TaskPriority, TaskStatus};
pub use task::{NewTask, PersistedTaskData, Task, TaskDraft, TaskPatch};
