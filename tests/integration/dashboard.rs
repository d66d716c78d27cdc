//! Snapshot swaps and frame consistency.

use cato::agent::AgentId;
use cato::core::{Snapshot, Task, TaskId, TaskStatus};
use cato::diagnostics::DiagnosticKind;
use cato::{Config, Dashboard, Error};
use tokio_test::assert_ok;

use crate::fixtures::{agents, at, example_run, example_snapshot, messages, SNAPSHOT_JSON};

/// The example run one hour later: C picked up by a worker with no owner
/// recorded, and the run extended to three hours.
fn later_snapshot() -> Snapshot {
    let mut tasks = example_run();
    tasks[1].status = TaskStatus::Done;
    tasks[1].progress_percent = 100;
    tasks[2] = Task::new("C", "Write client", at(45))
        .with_updated_at(at(180))
        .with_status(TaskStatus::InProgress)
        .with_progress(30)
        .with_dependencies(["B"]);
    Snapshot::new(tasks, agents(), messages())
}

#[test]
fn test_dashboard_summarizes_snapshot() {
    let dashboard = Dashboard::new(example_snapshot(), Config::default());

    assert!(dashboard.issues().is_empty());
    assert_eq!(dashboard.health().score, 100);
    assert_eq!(dashboard.metrics().tasks.total, 3);
    assert_eq!(dashboard.metrics().total_duration_minutes, 120);
    assert_eq!(dashboard.metrics().total_blockers, 1);
    assert_eq!(dashboard.graph().dependency_count(), 2);
    assert!(dashboard.mirror_divergences().is_empty());
    assert_eq!(dashboard.display_instant(), Some(at(0)));
}

#[test]
fn test_frame_at_reports_visible_state() {
    let dashboard = Dashboard::new(example_snapshot(), Config::default());
    let frame = assert_ok!(dashboard.frame_at(at(50)));

    assert_eq!(frame.instant, at(50));
    assert_eq!(frame.messages.len(), 3);
    assert_eq!(frame.task_bars.len(), 3);
    assert!(frame.state(&TaskId::from("B")).unwrap().is_active);
    assert!(frame.active_agents.is_empty());

    let early = assert_ok!(dashboard.frame_at(at(10)));
    assert_eq!(early.active_agents, vec![AgentId::from("worker-1")]);
}

#[test]
fn test_frame_at_clamps_to_axis() {
    let dashboard = Dashboard::new(example_snapshot(), Config::default());
    let frame = assert_ok!(dashboard.frame_at(at(-30)));
    assert_eq!(frame.instant, at(0));
    assert_eq!(frame.display_fraction, 0.0);
}

#[test]
fn test_swap_preserves_instant_and_recomputes_everything() {
    let mut dashboard = Dashboard::new(example_snapshot(), Config::default());
    assert_ok!(dashboard.seek(at(100)));
    let before = assert_ok!(dashboard.current_frame());

    let version = dashboard.replace_snapshot(later_snapshot());
    let after = assert_ok!(dashboard.current_frame());

    assert!(version > before.version);
    assert_eq!(after.version, version);
    assert_eq!(after.instant, at(100));
    // Same instant, different axis: the scrubber moves, the clock does not.
    assert!(after.display_fraction < before.display_fraction);

    // C now has no owner while in progress.
    assert_eq!(dashboard.issues().len(), 1);
    assert_eq!(dashboard.issues()[0].kind, DiagnosticKind::Zombie);
    assert_eq!(dashboard.health().score, 85);
    assert_eq!(dashboard.metrics().total_duration_minutes, 180);
    assert_eq!(
        after.state(&TaskId::from("B")).unwrap().status,
        TaskStatus::Done
    );
}

#[test]
fn test_issues_revealed_during_playback() {
    let dashboard = Dashboard::new(later_snapshot(), Config::default());
    // The zombie issue is dated by C's last update.
    assert!(assert_ok!(dashboard.frame_at(at(100))).issues.is_empty());
    assert_eq!(assert_ok!(dashboard.frame_at(at(180))).issues.len(), 1);
}

#[test]
fn test_swap_to_snapshot_without_axis_keeps_instant() {
    let mut dashboard = Dashboard::new(example_snapshot(), Config::default());
    assert_ok!(dashboard.seek(at(30)));

    dashboard.replace_snapshot(Snapshot::new(vec![], vec![], vec![]));
    assert_eq!(dashboard.display_instant(), Some(at(30)));
    assert!(matches!(dashboard.current_frame(), Err(Error::NoTimeAxis)));
    assert!(matches!(dashboard.seek(at(10)), Err(Error::NoTimeAxis)));

    dashboard.replace_snapshot(example_snapshot());
    assert_eq!(assert_ok!(dashboard.current_frame()).instant, at(30));
}

#[test]
fn test_producer_snapshot_dashboard() {
    let snapshot = assert_ok!(Snapshot::from_json(SNAPSHOT_JSON));
    let dashboard = Dashboard::new(snapshot, Config::default());

    assert_eq!(dashboard.health().score, 52);
    assert_eq!(dashboard.duplicates().len(), 1);
    assert_eq!(dashboard.duplicates()[0].id, "dup_group_1");
    assert_eq!(dashboard.duplicates()[0].size(), 2);
    assert_eq!(dashboard.mirror_divergences().len(), 1);
    assert_eq!(dashboard.metrics().active_agents, 1);
    assert_eq!(dashboard.metrics().total_blockers, 2);
}

#[test]
fn test_config_changes_analysis() {
    let snapshot = assert_ok!(Snapshot::from_json(SNAPSHOT_JSON));
    let mut config = Config::default();
    config.weights.critical = 10;
    config.diagnostics.duplicate_window_secs = 0.5;

    let dashboard = Dashboard::new(snapshot, config);
    assert_eq!(dashboard.health().score, 100 - 10 - 15 - 3);
    assert!(dashboard.duplicates().is_empty());
}
