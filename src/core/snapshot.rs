//! Immutable point-in-time read of a run.

use crate::agent::{Agent, AgentId};
use crate::core::message::Message;
use crate::core::task::{Task, TaskId};
use crate::error::{Error, Result};
use crate::timeline::{TimeAxis, TimeScale};
use crate::{clog_debug, clog_error};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotId(pub Uuid);

impl SnapshotId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Return first 8 characters of the UUID for display.
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for SnapshotId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tasks, agents and messages of one run plus its time bounds.
///
/// A snapshot with either bound missing is incomplete: it can still be
/// analyzed structurally, but [`Snapshot::time_axis`] refuses to build a
/// time axis for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub id: SnapshotId,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Bundle records, deriving the bounds from task timestamps.
    ///
    /// An empty task set leaves both bounds unset.
    pub fn new(tasks: Vec<Task>, agents: Vec<Agent>, messages: Vec<Message>) -> Self {
        let (start_time, end_time) = Self::bounds_from_tasks(&tasks);
        Self {
            id: SnapshotId::new(),
            tasks,
            agents,
            messages,
            start_time,
            end_time,
        }
    }

    /// Override the bounds, e.g. with the producer's own run window.
    pub fn with_bounds(
        mut self,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    /// Parse a snapshot delivered as JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(json).map_err(|e| {
            clog_error!("Snapshot::from_json failed: {}", e);
            e
        })?;
        clog_debug!(
            "Snapshot::from_json id={} tasks={} agents={} messages={} complete={}",
            snapshot.id.short(),
            snapshot.tasks.len(),
            snapshot.agents.len(),
            snapshot.messages.len(),
            snapshot.is_complete()
        );
        Ok(snapshot)
    }

    /// Earliest and latest timestamp over every task field.
    pub fn bounds_from_tasks(tasks: &[Task]) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let stamps = tasks.iter().flat_map(|task| task.timestamps());
        let (min, max) = stamps.fold((None, None), |(min, max), ts| {
            (
                Some(min.map_or(ts, |m: DateTime<Utc>| m.min(ts))),
                Some(max.map_or(ts, |m: DateTime<Utc>| m.max(ts))),
            )
        });
        (min, max)
    }

    /// Whether both time bounds are present.
    pub fn is_complete(&self) -> bool {
        self.start_time.is_some() && self.end_time.is_some()
    }

    /// Time axis for this snapshot using the given scale exponent.
    ///
    /// # Errors
    /// `Error::NoTimeAxis` when a bound is missing, `Error::Validation` when
    /// the exponent is unusable or the bounds are reversed.
    pub fn time_axis(&self, exponent: f64) -> Result<TimeAxis> {
        let (Some(start), Some(end)) = (self.start_time, self.end_time) else {
            return Err(Error::NoTimeAxis);
        };
        TimeAxis::new(start, end, TimeScale::new(exponent)?)
    }

    /// Run length in whole minutes, 0 without a time axis.
    pub fn duration_minutes(&self) -> i64 {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => (end - start).num_minutes().max(0),
            _ => 0,
        }
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    /// Like [`Snapshot::task`], but a missing id is an error.
    pub fn require_task(&self, id: &TaskId) -> Result<&Task> {
        self.task(id).ok_or_else(|| Error::TaskNotFound { id: id.clone() })
    }

    pub fn agent(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.iter().find(|agent| &agent.id == id)
    }
}
