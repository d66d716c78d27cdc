//! Severity-weighted health score plus plain task counts.

use serde::{Deserialize, Serialize};

use crate::core::{Task, TaskStatus};
use crate::diagnostics::analyzer::{DiagnosticIssue, Severity};

/// Points deducted per issue of each severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityWeights {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl Default for SeverityWeights {
    fn default() -> Self {
        Self {
            critical: 30,
            high: 15,
            medium: 7,
            low: 3,
        }
    }
}

impl SeverityWeights {
    pub fn weight(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }
}

/// Task counts by status, independent of any diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TaskSummary {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub blocked: usize,
    pub todo: usize,
    /// `completed / total` in `[0, 1]`, 0 for an empty list.
    pub completion_rate: f64,
}

impl TaskSummary {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let count = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();
        let total = tasks.len();
        let completed = count(TaskStatus::Done);
        Self {
            total,
            completed,
            in_progress: count(TaskStatus::InProgress),
            blocked: count(TaskStatus::Blocked),
            todo: count(TaskStatus::Todo),
            completion_rate: if total == 0 {
                0.0
            } else {
                completed as f64 / total as f64
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthMetrics {
    /// 0 to 100.
    pub score: u8,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub tasks: TaskSummary,
}

impl HealthMetrics {
    pub fn issue_count(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HealthScorer {
    weights: SeverityWeights,
}

impl HealthScorer {
    pub fn new(weights: SeverityWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> SeverityWeights {
        self.weights
    }

    pub fn score(&self, issues: &[DiagnosticIssue], tasks: &[Task]) -> HealthMetrics {
        let count = |severity: Severity| issues.iter().filter(|i| i.severity == severity).count();
        let penalty: u64 = issues
            .iter()
            .map(|issue| u64::from(self.weights.weight(issue.severity)))
            .sum();

        HealthMetrics {
            score: 100u64.saturating_sub(penalty) as u8,
            critical: count(Severity::Critical),
            high: count(Severity::High),
            medium: count(Severity::Medium),
            low: count(Severity::Low),
            tasks: TaskSummary::from_tasks(tasks),
        }
    }
}

/// Score with the default weights.
pub fn score(issues: &[DiagnosticIssue], tasks: &[Task]) -> HealthMetrics {
    HealthScorer::default().score(issues, tasks)
}
