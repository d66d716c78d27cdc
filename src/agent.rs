//! Agents taking part in a run and their derived statistics.

use crate::core::{Message, Snapshot, Task, TaskId, TaskStatus};
use crate::timeline::resolve;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of an agent (coordinator or worker).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub skills: Vec<String>,
    /// Tasks the upstream system lists as currently active for this agent.
    #[serde(default)]
    pub current_task_ids: Vec<TaskId>,
}

impl Agent {
    pub fn new(id: impl Into<AgentId>, name: &str, role: &str) -> Self {
        Self {
            id: id.into(),
            name: name.to_string(),
            role: role.to_string(),
            skills: Vec::new(),
            current_task_ids: Vec::new(),
        }
    }

    pub fn with_current_tasks<I, T>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TaskId>,
    {
        self.current_task_ids = tasks.into_iter().map(Into::into).collect();
        self
    }

    /// Whether any task owned by this agent is being worked on at `instant`.
    pub fn is_active_at(&self, tasks: &[Task], instant: DateTime<Utc>) -> bool {
        tasks
            .iter()
            .filter(|task| task.owner() == Some(&self.id))
            .any(|task| resolve(task, instant).is_active)
    }
}

/// Agents with at least one task in progress at `instant`, in snapshot order.
pub fn active_agents_at(snapshot: &Snapshot, instant: DateTime<Utc>) -> Vec<AgentId> {
    snapshot
        .agents
        .iter()
        .filter(|agent| agent.is_active_at(&snapshot.tasks, instant))
        .map(|agent| agent.id.clone())
        .collect()
}

/// Per-agent figures derived from tasks and messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentStats {
    pub agent_id: AgentId,
    /// Assigned tasks that are `todo` or `in_progress`.
    pub current_task_ids: Vec<TaskId>,
    pub completed_task_ids: Vec<TaskId>,
    pub total_hours_worked: f64,
    pub average_task_hours: f64,
    pub messages_sent: usize,
    pub messages_received: usize,
    pub blockers_reported: usize,
}

impl AgentStats {
    pub fn collect(agent: &Agent, tasks: &[Task], messages: &[Message]) -> Self {
        let owned: Vec<&Task> = tasks
            .iter()
            .filter(|task| task.owner() == Some(&agent.id))
            .collect();

        let current_task_ids = owned
            .iter()
            .filter(|t| matches!(t.status, TaskStatus::Todo | TaskStatus::InProgress))
            .map(|t| t.id.clone())
            .collect();
        let completed: Vec<&&Task> = owned.iter().filter(|t| t.is_done()).collect();

        let total_hours_worked: f64 = completed.iter().map(|t| t.actual_hours).sum();
        let average_task_hours = if completed.is_empty() {
            0.0
        } else {
            total_hours_worked / completed.len() as f64
        };

        let sent = messages.iter().filter(|m| m.from_agent_id == agent.id);
        let blockers_reported = sent.clone().filter(|m| m.is_blocking()).count();

        Self {
            agent_id: agent.id.clone(),
            current_task_ids,
            completed_task_ids: completed.iter().map(|t| t.id.clone()).collect(),
            total_hours_worked,
            average_task_hours,
            messages_sent: sent.count(),
            messages_received: messages.iter().filter(|m| m.to_agent_id == agent.id).count(),
            blockers_reported,
        }
    }
}
