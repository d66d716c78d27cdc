//! Time axis of a snapshot: instants, elapsed milliseconds and display
//! positions, all through one [`TimeScale`].

use crate::core::{Task, TaskId};
use crate::error::{Error, Result};
use crate::timeline::scale::TimeScale;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Horizontal extent of a task bar as display fractions in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskBar {
    pub task_id: TaskId,
    pub start: f64,
    pub end: f64,
}

impl TaskBar {
    pub fn width(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAxis {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    scale: TimeScale,
}

impl TimeAxis {
    /// # Errors
    /// `Error::Validation` when `end` precedes `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, scale: TimeScale) -> Result<Self> {
        if end < start {
            return Err(Error::Validation(format!(
                "time axis end {} precedes start {}",
                end, start
            )));
        }
        Ok(Self { start, end, scale })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn scale(&self) -> TimeScale {
        self.scale
    }

    /// Length of the axis in milliseconds.
    pub fn total_ms(&self) -> f64 {
        (self.end - self.start).num_milliseconds() as f64
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Clamp `instant` onto the axis.
    pub fn clamp(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        instant.clamp(self.start, self.end)
    }

    /// Milliseconds since `start`, clamped to the axis.
    pub fn elapsed_ms(&self, instant: DateTime<Utc>) -> f64 {
        (self.clamp(instant) - self.start).num_milliseconds() as f64
    }

    /// Instant `elapsed_ms` after `start`, clamped to the axis.
    pub fn instant_at(&self, elapsed_ms: f64) -> DateTime<Utc> {
        let total = self.total_ms();
        let elapsed = if elapsed_ms.is_nan() {
            0.0
        } else {
            elapsed_ms.clamp(0.0, total)
        };
        self.start + Duration::milliseconds(elapsed.round() as i64)
    }

    /// Display-time milliseconds for `instant`.
    pub fn display_elapsed(&self, instant: DateTime<Utc>) -> f64 {
        self.scale.to_display(self.elapsed_ms(instant), self.total_ms())
    }

    /// Scrubber position of `instant` in `[0, 1]`; 0 on a zero-length axis.
    pub fn display_fraction(&self, instant: DateTime<Utc>) -> f64 {
        let total = self.total_ms();
        if total <= 0.0 {
            return 0.0;
        }
        self.display_elapsed(instant) / total
    }

    /// Inverse of [`display_fraction`](Self::display_fraction).
    pub fn instant_at_display_fraction(&self, fraction: f64) -> DateTime<Utc> {
        let total = self.total_ms();
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        self.instant_at(self.scale.to_linear(fraction * total, total))
    }

    /// Linear position of the task's creation in `[0, 1]`.
    pub fn linear_position(&self, task: &Task) -> f64 {
        let total = self.total_ms();
        if total <= 0.0 {
            return 0.0;
        }
        self.elapsed_ms(task.created_at) / total
    }

    /// Scaled position of the task's creation in `[0, 1]`.
    pub fn scaled_position(&self, task: &Task) -> f64 {
        self.display_fraction(task.created_at)
    }

    /// Bar spanning the task's effective window, placed with the same scale
    /// as the scrubber so both line up.
    pub fn task_bar(&self, task: &Task) -> TaskBar {
        TaskBar {
            task_id: task.id.clone(),
            start: self.display_fraction(task.effective_start()),
            end: self.display_fraction(task.effective_end()),
        }
    }
}
