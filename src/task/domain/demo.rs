//! Fixed demo board shown when the row store cannot be reached.

use super::{PersistedTaskData, Task, TaskId, TaskPriority, TaskStatus, TaskTitle};
use crate::identity::domain::UserId;
use chrono::{DateTime, TimeDelta, Utc};

/// Days between the Unix epoch and 2024-01-01.
const DEMO_EPOCH_DAYS: i64 = 19_723;

struct DemoTask {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    status: TaskStatus,
    priority: TaskPriority,
    day_offset: i64,
}

const DEMO_TASKS: [DemoTask; 6] = [
    DemoTask {
        id: "1",
        title: "Setup project structure",
        description: "Create the basic project structure and components",
        status: TaskStatus::Done,
        priority: TaskPriority::High,
        day_offset: 0,
    },
    DemoTask {
        id: "2",
        title: "Implement authentication",
        description: "Add Supabase authentication with login and register",
        status: TaskStatus::Done,
        priority: TaskPriority::Medium,
        day_offset: 1,
    },
    DemoTask {
        id: "3",
        title: "Create Kanban board",
        description: "Build the main Kanban board with drag and drop functionality",
        status: TaskStatus::InProgress,
        priority: TaskPriority::High,
        day_offset: 2,
    },
    DemoTask {
        id: "4",
        title: "Add task management",
        description: "Implement CRUD operations for tasks",
        status: TaskStatus::InProgress,
        priority: TaskPriority::Medium,
        day_offset: 3,
    },
    DemoTask {
        id: "5",
        title: "Responsive design",
        description: "Make the app fully responsive for mobile and desktop",
        status: TaskStatus::Todo,
        priority: TaskPriority::Medium,
        day_offset: 4,
    },
    DemoTask {
        id: "6",
        title: "Add team collaboration",
        description: "Implement real-time updates and team member management",
        status: TaskStatus::Todo,
        priority: TaskPriority::Low,
        day_offset: 5,
    },
];

/// Builds the six-task demo board owned by `owner`.
///
/// Tasks are dated 2024-01-01 through 2024-01-06 at midnight UTC, with
/// matching created and updated timestamps.
#[must_use]
pub fn demo_tasks(owner: &UserId) -> Vec<Task> {
    DEMO_TASKS
        .iter()
        .map(|demo| {
            let timestamp = demo_timestamp(demo.day_offset);
            Task::from_persisted(PersistedTaskData {
                id: TaskId::literal(demo.id),
                title: TaskTitle::literal(demo.title),
                description: demo.description.to_owned(),
                status: demo.status,
                priority: demo.priority,
                created_by: owner.clone(),
                created_at: timestamp,
                updated_at: timestamp,
            })
        })
        .collect()
}

fn demo_timestamp(day_offset: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + TimeDelta::days(DEMO_EPOCH_DAYS + day_offset)
}
