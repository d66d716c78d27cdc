//! Project-level figures: counts, durations, parallelism and agent load.
//!
//! Task durations here span `created_at` to `updated_at`; tasks whose
//! window is empty or reversed are left out of every duration figure.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::agent::AgentStats;
use crate::core::{Snapshot, Task};
use crate::diagnostics::health::TaskSummary;

/// How much task windows overlapped.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Parallelism {
    /// Most tasks open at the same moment.
    pub peak: usize,
    /// Total task time divided by the span it covers.
    pub average: f64,
    /// `span / total task time`, capped at 1.
    pub efficiency: f64,
}

impl Parallelism {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let windows: Vec<(DateTime<Utc>, DateTime<Utc>)> = task_windows(tasks).collect();
        if windows.is_empty() {
            return Self::default();
        }

        // Ends sort before starts at the same instant so back-to-back tasks
        // do not count as overlapping.
        let mut events: Vec<(DateTime<Utc>, i32)> = windows
            .iter()
            .flat_map(|&(start, end)| [(start, 1), (end, -1)])
            .collect();
        events.sort();

        let mut open: i32 = 0;
        let mut peak: i32 = 0;
        let mut covered_task_ms: f64 = 0.0;
        let mut last = events[0].0;
        for &(at, delta) in &events {
            if at > last && open > 0 {
                covered_task_ms += (at - last).num_milliseconds() as f64 * f64::from(open);
            }
            open += delta;
            peak = peak.max(open);
            last = at;
        }

        let span_ms = events
            .last()
            .map(|&(end, _)| (end - events[0].0).num_milliseconds() as f64)
            .unwrap_or(0.0);
        let total_task_ms: f64 = windows
            .iter()
            .map(|&(start, end)| (end - start).num_milliseconds() as f64)
            .sum();

        Self {
            peak: peak.max(0) as usize,
            average: if span_ms > 0.0 {
                covered_task_ms / span_ms
            } else {
                0.0
            },
            efficiency: if span_ms > 0.0 && total_task_ms > 0.0 {
                (span_ms / total_task_ms).min(1.0)
            } else {
                0.0
            },
        }
    }
}

fn task_windows(tasks: &[Task]) -> impl Iterator<Item = (DateTime<Utc>, DateTime<Utc>)> + '_ {
    tasks
        .iter()
        .filter(|task| task.updated_at > task.created_at)
        .map(|task| (task.created_at, task.updated_at))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectMetrics {
    pub tasks: TaskSummary,
    /// Span of every `created_at`/`updated_at`, rounded to whole minutes.
    pub total_duration_minutes: i64,
    pub average_task_duration_minutes: f64,
    pub parallelism: Parallelism,
    pub total_agents: usize,
    /// Agents with at least one current task.
    pub active_agents: usize,
    pub tasks_per_agent: f64,
    /// Messages flagged as blocking.
    pub total_blockers: usize,
    /// `blocked / total` in `[0, 1]`.
    pub blocked_task_percentage: f64,
    pub agents: Vec<AgentStats>,
}

impl ProjectMetrics {
    pub fn compute(snapshot: &Snapshot) -> Self {
        let tasks = &snapshot.tasks;
        let summary = TaskSummary::from_tasks(tasks);

        let stamps = tasks.iter().flat_map(|t| [t.created_at, t.updated_at]);
        let span_ms = match (stamps.clone().min(), stamps.max()) {
            (Some(min), Some(max)) => (max - min).num_milliseconds() as f64,
            _ => 0.0,
        };

        let durations: Vec<f64> = task_windows(tasks)
            .map(|(start, end)| (end - start).num_milliseconds() as f64 / 60_000.0)
            .collect();
        let average_task_duration_minutes = if durations.is_empty() {
            0.0
        } else {
            durations.iter().sum::<f64>() / durations.len() as f64
        };

        let total_agents = snapshot.agents.len();
        let ratio = |n: usize, d: usize| if d == 0 { 0.0 } else { n as f64 / d as f64 };

        Self {
            tasks: summary,
            total_duration_minutes: (span_ms / 60_000.0).round() as i64,
            average_task_duration_minutes,
            parallelism: Parallelism::from_tasks(tasks),
            total_agents,
            active_agents: snapshot
                .agents
                .iter()
                .filter(|agent| !agent.current_task_ids.is_empty())
                .count(),
            tasks_per_agent: ratio(summary.total, total_agents),
            total_blockers: snapshot.messages.iter().filter(|m| m.is_blocking()).count(),
            blocked_task_percentage: ratio(summary.blocked, summary.total),
            agents: snapshot
                .agents
                .iter()
                .map(|agent| AgentStats::collect(agent, tasks, &snapshot.messages))
                .collect(),
        }
    }
}
