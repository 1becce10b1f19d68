//! Unit tests for the task board.


use std::sync::Mutex;

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::identity::domain::UserId;
use crate::task::domain::{PersistedTaskData, Task, TaskId, TaskPriority, TaskStatus, TaskTitle};

/// Clock that starts at a fixed instant and advances by one second on every
/// reading.
pub(super) struct StepClock {
    next: Mutex<DateTime<Utc>>,
}

impl StepClock {
    pub(super) fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            next: Mutex::new(start),
        }
    }
}

impl Clock for StepClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let mut next = self
            .next
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let now = *next;
        *next = now + TimeDelta::seconds(1);
        now
    }
}

pub(super) fn fixed_start() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + TimeDelta::days(20_000)
}

pub(super) fn owner() -> UserId {
    UserId::new("user-1")
}

pub(super) fn stored_task(id: &str, status: TaskStatus, day: i64) -> Task {
    let timestamp = fixed_start() - TimeDelta::days(day);
    Task::from_persisted(PersistedTaskData {
        id: TaskId::new(id).expect("valid task id"),
        title: TaskTitle::new(format!("Task {id}")).expect("valid title"),
        description: String::new(),
        status,
        priority: TaskPriority::Medium,
        created_by: owner(),
        created_at: timestamp,
        updated_at: timestamp,
    })
}
