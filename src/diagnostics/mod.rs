//! Structural diagnostics, health scoring and project metrics.
//!
//! Everything here is a pure function of a task list or snapshot and is
//! recomputed only when the snapshot changes, never per playback tick.

pub mod analyzer;
pub mod health;
pub mod metrics;

pub use analyzer::{
    analyze, issues_visible_at, Analyzer, AnalyzerConfig, DiagnosticIssue, DiagnosticKind,
    Severity,
};
pub use health::{score, HealthMetrics, HealthScorer, SeverityWeights, TaskSummary};
pub use metrics::{Parallelism, ProjectMetrics};
