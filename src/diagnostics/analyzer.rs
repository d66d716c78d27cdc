//! Structural checks over the dependency graph.
//!
//! Every check reads the same [`DependencyGraph`]. Issues come out in a
//! fixed order: cycle, total blockage, zombies, bottlenecks, redundant
//! dependencies; within a check, tasks keep snapshot order.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::{DependencyGraph, Task, TaskId, TaskStatus};
use crate::clog_debug;

/// Which structural problem an issue describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    Cycle,
    TotalBlockage,
    Zombie,
    Bottleneck,
    RedundantDependency,
}

impl DiagnosticKind {
    /// Fixed severity of each kind.
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::Cycle | DiagnosticKind::TotalBlockage => Severity::Critical,
            DiagnosticKind::Zombie => Severity::High,
            DiagnosticKind::Bottleneck => Severity::Medium,
            DiagnosticKind::RedundantDependency => Severity::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticIssue {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub affected_tasks: Vec<TaskId>,
    pub description: String,
    pub recommendation: String,
    /// Latest `updated_at` among the affected tasks; `None` when none of
    /// them is in the task list.
    pub detected_at: Option<DateTime<Utc>>,
}

impl DiagnosticIssue {
    fn new(
        kind: DiagnosticKind,
        affected_tasks: Vec<TaskId>,
        description: String,
        recommendation: String,
        tasks: &[Task],
    ) -> Self {
        let detected_at = tasks
            .iter()
            .filter(|task| affected_tasks.contains(&task.id))
            .map(|task| task.updated_at)
            .max();
        Self {
            kind,
            severity: kind.severity(),
            affected_tasks,
            description,
            recommendation,
            detected_at,
        }
    }

    pub fn affects(&self, id: &TaskId) -> bool {
        self.affected_tasks.contains(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Minimum number of dependents that makes an unfinished task a
    /// bottleneck.
    pub bottleneck_threshold: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            bottleneck_threshold: 3,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> AnalyzerConfig {
        self.config
    }

    /// Run every check over `tasks`.
    pub fn analyze(&self, tasks: &[Task]) -> Vec<DiagnosticIssue> {
        let graph = DependencyGraph::from_tasks(tasks);
        self.analyze_graph(tasks, &graph)
    }

    /// Run every check against an index already built from `tasks`.
    pub fn analyze_graph(&self, tasks: &[Task], graph: &DependencyGraph) -> Vec<DiagnosticIssue> {
        let mut issues = Vec::new();
        issues.extend(cycle(tasks, graph));
        issues.extend(total_blockage(tasks, graph));
        issues.extend(zombies(tasks));
        issues.extend(self.bottlenecks(tasks, graph));
        issues.extend(redundant_dependencies(tasks, graph));

        clog_debug!(
            "Analyzer: {} task(s), {} issue(s) ({} critical)",
            tasks.len(),
            issues.len(),
            issues
                .iter()
                .filter(|issue| issue.severity == Severity::Critical)
                .count()
        );
        issues
    }

    fn bottlenecks(&self, tasks: &[Task], graph: &DependencyGraph) -> Vec<DiagnosticIssue> {
        unique(tasks)
            .filter(|task| task.status != TaskStatus::Done)
            .filter_map(|task| {
                let count = graph.dependent_count(&task.id);
                (count >= self.config.bottleneck_threshold).then(|| {
                    DiagnosticIssue::new(
                        DiagnosticKind::Bottleneck,
                        vec![task.id.clone()],
                        format!("Task '{}' is blocking {} other tasks", task.name, count),
                        format!("Prioritize completing this task to unblock {} tasks", count),
                        tasks,
                    )
                })
            })
            .collect()
    }
}

/// Run every check with the default configuration.
pub fn analyze(tasks: &[Task]) -> Vec<DiagnosticIssue> {
    Analyzer::default().analyze(tasks)
}

/// Issues already detected at `instant`, for revealing diagnostics during
/// playback. Issues without a detection time are always visible.
pub fn issues_visible_at(
    issues: &[DiagnosticIssue],
    instant: DateTime<Utc>,
) -> Vec<&DiagnosticIssue> {
    issues
        .iter()
        .filter(|issue| issue.detected_at.map_or(true, |at| at <= instant))
        .collect()
}

/// Tasks with first-occurrence ids, matching the graph's node set.
fn unique(tasks: &[Task]) -> impl Iterator<Item = &Task> {
    let mut seen = std::collections::HashSet::new();
    tasks.iter().filter(move |task| seen.insert(&task.id))
}

fn cycle(tasks: &[Task], graph: &DependencyGraph) -> Option<DiagnosticIssue> {
    let path = graph.find_cycle()?;
    let chain = path
        .iter()
        .chain(path.first())
        .map(TaskId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ");
    Some(DiagnosticIssue::new(
        DiagnosticKind::Cycle,
        path,
        format!("Circular dependency detected: {}", chain),
        "Remove one of the dependencies in the cycle so the tasks can be ordered".to_string(),
        tasks,
    ))
}

fn total_blockage(tasks: &[Task], graph: &DependencyGraph) -> Option<DiagnosticIssue> {
    let todo: Vec<&Task> = unique(tasks)
        .filter(|task| task.status == TaskStatus::Todo)
        .collect();
    if todo.is_empty() || !todo.iter().all(|task| graph.is_blocked_by_dependency(&task.id)) {
        return None;
    }
    Some(DiagnosticIssue::new(
        DiagnosticKind::TotalBlockage,
        todo.iter().map(|task| task.id.clone()).collect(),
        format!(
            "No forward progress possible: all {} todo task(s) wait on unfinished dependencies",
            todo.len()
        ),
        "Finish or unblock an in-flight dependency before scheduling more work".to_string(),
        tasks,
    ))
}

fn zombies(tasks: &[Task]) -> Vec<DiagnosticIssue> {
    unique(tasks)
        .filter(|task| task.status == TaskStatus::InProgress && task.owner().is_none())
        .map(|task| {
            DiagnosticIssue::new(
                DiagnosticKind::Zombie,
                vec![task.id.clone()],
                format!(
                    "Task '{}' is marked IN_PROGRESS but has no assigned agent",
                    task.name
                ),
                "Reset to TODO status or assign to an available agent".to_string(),
                tasks,
            )
        })
        .collect()
}

fn redundant_dependencies(tasks: &[Task], graph: &DependencyGraph) -> Vec<DiagnosticIssue> {
    unique(tasks)
        .flat_map(|task| {
            graph
                .redundant_dependencies(&task.id)
                .into_iter()
                .map(move |dep| (task, dep.clone()))
        })
        .map(|(task, dep)| {
            DiagnosticIssue::new(
                DiagnosticKind::RedundantDependency,
                vec![task.id.clone(), dep.clone()],
                format!(
                    "Task '{}' depends on {} directly, but it is already implied by another dependency",
                    task.name, dep
                ),
                format!("Remove the direct dependency on {}", dep),
                tasks,
            )
        })
        .collect()
}
