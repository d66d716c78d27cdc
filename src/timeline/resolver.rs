//! Reconstructs what a task looked like at an arbitrary instant.

use crate::core::{Task, TaskId, TaskStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Visual state of a task at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskState {
    pub status: TaskStatus,
    pub progress: u8,
    pub is_active: bool,
}

impl TaskState {
    const NOT_STARTED: Self = Self {
        status: TaskStatus::Todo,
        progress: 0,
        is_active: false,
    };
}

/// Resolve `task` at `instant`.
///
/// Before the effective start the task is untouched todo work. At or after
/// the effective end it freezes at its persisted status and progress, and
/// that check runs before interpolation so a zero-length window never
/// divides by zero. Anything in between is in progress with linearly
/// interpolated progress. An instant equal to the start of a non-empty
/// window is therefore in progress at 0%.
pub fn resolve(task: &Task, instant: DateTime<Utc>) -> TaskState {
    let start = task.effective_start();
    let end = task.effective_end();

    if instant < start {
        return TaskState::NOT_STARTED;
    }
    if instant >= end {
        return TaskState {
            status: task.status,
            progress: task.progress_percent.min(100),
            is_active: false,
        };
    }

    let elapsed = (instant - start).num_milliseconds() as f64;
    let duration = (end - start).num_milliseconds() as f64;
    let progress = if duration > 0.0 {
        (100.0 * elapsed / duration).min(100.0).round() as u8
    } else {
        0
    };

    TaskState {
        status: TaskStatus::InProgress,
        progress,
        is_active: true,
    }
}

/// Resolve every task at the same instant.
pub fn resolve_all(tasks: &[Task], instant: DateTime<Utc>) -> HashMap<TaskId, TaskState> {
    tasks
        .iter()
        .map(|task| (task.id.clone(), resolve(task, instant)))
        .collect()
}
