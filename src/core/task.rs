//! Task data model as delivered by the orchestration run.
//!
//! Tasks arrive read-only inside a [`Snapshot`](crate::core::Snapshot).
//! Nothing in this crate mutates them after construction; the builder-style
//! `with_*` methods exist for fixtures and loaders.

use crate::agent::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a task within a run.
///
/// Upstream ids are opaque strings (board card ids, UUIDs, or synthetic
/// keys), so no format is imposed here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted task status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started.
    #[default]
    Todo,
    /// An agent is (believed to be) working on it.
    InProgress,
    /// Finished.
    Done,
    /// Explicitly reported as blocked.
    Blocked,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Todo => write!(f, "todo"),
            TaskStatus::InProgress => write!(f, "in_progress"),
            TaskStatus::Done => write!(f, "done"),
            TaskStatus::Blocked => write!(f, "blocked"),
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
            Priority::Urgent => write!(f, "urgent"),
        }
    }
}

/// A single task record.
///
/// `dependency_ids` is the source of truth for edges. `dependent_task_ids`
/// is the upstream denormalized mirror; it is kept for divergence checks
/// only; see [`DependencyGraph`](crate::core::DependencyGraph) for the
/// authoritative inverse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    /// 0-100.
    #[serde(default)]
    pub progress_percent: u8,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_hours: f64,
    #[serde(default)]
    pub actual_hours: f64,
    #[serde(default)]
    pub assigned_agent_id: Option<AgentId>,
    #[serde(default)]
    pub dependency_ids: Vec<TaskId>,
    #[serde(default)]
    pub dependent_task_ids: Vec<TaskId>,
    #[serde(default)]
    pub parent_task_id: Option<TaskId>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Task {
    /// Create a `todo` task created and last updated at `created_at`.
    pub fn new(id: impl Into<TaskId>, name: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: name.to_string(),
            description: String::new(),
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            progress_percent: 0,
            created_at,
            started_at: None,
            updated_at: created_at,
            completed_at: None,
            estimated_hours: 0.0,
            actual_hours: 0.0,
            assigned_agent_id: None,
            dependency_ids: Vec::new(),
            dependent_task_ids: Vec::new(),
            parent_task_id: None,
            labels: Vec::new(),
            metadata: serde_json::Map::new(),
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set progress, clamped to 100.
    pub fn with_progress(mut self, percent: u8) -> Self {
        self.progress_percent = percent.min(100);
        self
    }

    pub fn with_started_at(mut self, at: DateTime<Utc>) -> Self {
        self.started_at = Some(at);
        self
    }

    pub fn with_updated_at(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = at;
        self
    }

    pub fn with_completed_at(mut self, at: DateTime<Utc>) -> Self {
        self.completed_at = Some(at);
        self
    }

    pub fn with_hours(mut self, estimated: f64, actual: f64) -> Self {
        self.estimated_hours = estimated;
        self.actual_hours = actual;
        self
    }

    pub fn with_agent(mut self, agent: impl Into<AgentId>) -> Self {
        self.assigned_agent_id = Some(agent.into());
        self
    }

    pub fn with_dependencies<I, T>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TaskId>,
    {
        self.dependency_ids = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dependents<I, T>(mut self, dependents: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TaskId>,
    {
        self.dependent_task_ids = dependents.into_iter().map(Into::into).collect();
        self
    }

    /// Start of the interpolation window: `started_at`, else `created_at`.
    pub fn effective_start(&self) -> DateTime<Utc> {
        self.started_at.unwrap_or(self.created_at)
    }

    /// End of the interpolation window.
    pub fn effective_end(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    /// The owning agent, treating an empty id as unassigned.
    pub fn owner(&self) -> Option<&AgentId> {
        self.assigned_agent_id
            .as_ref()
            .filter(|agent| !agent.as_str().trim().is_empty())
    }

    /// Whether `created_at <= started_at <= updated_at` and
    /// `completed_at >= started_at` hold.
    pub fn has_monotonic_timestamps(&self) -> bool {
        let start = self.effective_start();
        if start < self.created_at || self.updated_at < start {
            return false;
        }
        match (self.started_at, self.completed_at) {
            (Some(started), Some(completed)) => completed >= started,
            _ => true,
        }
    }

    /// All timestamps present on the record.
    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        [
            Some(self.created_at),
            self.started_at,
            Some(self.updated_at),
            self.completed_at,
        ]
        .into_iter()
        .flatten()
    }
}
