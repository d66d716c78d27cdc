//! Scale, axis and resolver working together over whole snapshots.

use chrono::Duration;

use cato::core::{message::messages_until, Snapshot, TaskId, TaskStatus};
use cato::timeline::{resolve, resolve_all, to_display, to_linear, TimeAxis, TimeScale};
use cato::Error;
use tokio_test::{assert_err, assert_ok};

use crate::fixtures::{at, example_snapshot, t0, SNAPSHOT_JSON};

#[test]
fn test_round_trip_over_realistic_durations() {
    // One second, one hour, one working day.
    for total in [1_000.0, 3_600_000.0, 28_800_000.0] {
        for exponent in [0.2, 0.4, 1.0, 1.5] {
            for step in 0..=50 {
                let x = total * f64::from(step) / 50.0;
                let back = to_linear(to_display(x, total, exponent), total, exponent);
                assert!(
                    (back - x).abs() <= 1e-6 * total.max(1.0),
                    "x={} total={} exponent={} back={}",
                    x,
                    total,
                    exponent,
                    back
                );
            }
        }
    }
}

#[test]
fn test_degenerate_total_duration() {
    assert_eq!(to_display(500.0, 0.0, 0.4), 0.0);
    assert_eq!(to_linear(500.0, -1.0, 0.4), 0.0);
}

#[test]
fn test_snapshot_axis_lines_up_scrubber_and_bars() {
    let snapshot = example_snapshot();
    let axis = assert_ok!(snapshot.time_axis(0.4));
    assert_eq!(axis.start(), at(0));
    assert_eq!(axis.end(), at(120));

    for task in &snapshot.tasks {
        let bar = axis.task_bar(task);
        assert_eq!(bar.start, axis.display_fraction(task.effective_start()));
        assert_eq!(bar.end, axis.display_fraction(task.effective_end()));
        assert!(bar.start <= bar.end);
    }
}

#[test]
fn test_snapshot_without_bounds_has_no_axis() {
    let snapshot = Snapshot::new(vec![], vec![], vec![]);
    let err = assert_err!(snapshot.time_axis(0.4));
    assert!(matches!(err, Error::NoTimeAxis));
}

#[test]
fn test_invalid_exponent_is_rejected_at_axis_construction() {
    let snapshot = example_snapshot();
    assert!(matches!(snapshot.time_axis(0.0), Err(Error::Validation(_))));
    assert!(matches!(
        TimeAxis::new(at(10), at(0), TimeScale::default()),
        Err(Error::Validation(_))
    ));
}

#[test]
fn test_scrubbing_through_the_example_run() {
    let snapshot = example_snapshot();
    let axis = assert_ok!(snapshot.time_axis(0.4));

    // Scrub handle at 50% display time is well before the real midpoint.
    let instant = axis.instant_at_display_fraction(0.5);
    assert!(instant < at(60));

    let states = resolve_all(&snapshot.tasks, at(15));
    assert_eq!(states[&TaskId::from("A")].status, TaskStatus::InProgress);
    assert_eq!(states[&TaskId::from("A")].progress, 50);
    assert_eq!(states[&TaskId::from("B")].status, TaskStatus::Todo);
    assert!(!states[&TaskId::from("C")].is_active);

    let states = resolve_all(&snapshot.tasks, at(60));
    assert_eq!(states[&TaskId::from("A")].status, TaskStatus::Done);
    assert_eq!(states[&TaskId::from("A")].progress, 100);
    assert_eq!(states[&TaskId::from("B")].progress, 50);
    assert!(states[&TaskId::from("C")].is_active);

    let states = resolve_all(&snapshot.tasks, at(500));
    assert!(states.values().all(|state| !state.is_active));
    assert_eq!(states[&TaskId::from("B")].status, TaskStatus::Todo);
}

#[test]
fn test_started_at_delays_the_window() {
    let snapshot = assert_ok!(Snapshot::from_json(SNAPSHOT_JSON));
    let auth = snapshot.task(&"t-2".into()).unwrap();

    // Created at 14:10 but only started at 14:40.
    let before = resolve(auth, t0() + Duration::minutes(20));
    assert_eq!(before.status, TaskStatus::Todo);
    assert!(!before.is_active);

    let during = resolve(auth, t0() + Duration::minutes(65));
    assert_eq!(during.status, TaskStatus::InProgress);
    assert_eq!(during.progress, 50);

    let after = resolve(auth, t0() + Duration::minutes(200));
    assert_eq!(after.status, TaskStatus::InProgress);
    assert_eq!(after.progress, 60);
    assert!(!after.is_active);
}

#[test]
fn test_blocked_task_freezes_as_blocked() {
    let snapshot = assert_ok!(Snapshot::from_json(SNAPSHOT_JSON));
    let shell = snapshot.task(&"t-4".into()).unwrap();
    let state = resolve(shell, shell.updated_at);
    assert_eq!(state.status, TaskStatus::Blocked);
    assert_eq!(state.progress, 20);
}

#[test]
fn test_messages_appear_as_time_advances() {
    let snapshot = example_snapshot();
    assert_eq!(messages_until(&snapshot.messages, at(0)).len(), 1);
    assert_eq!(messages_until(&snapshot.messages, at(52)).len(), 3);
    assert_eq!(messages_until(&snapshot.messages, at(500)).len(), 4);
}

#[test]
fn test_agents_active_over_time() {
    let snapshot = example_snapshot();
    let worker = snapshot.agent(&"worker-1".into()).unwrap();
    assert!(worker.is_active_at(&snapshot.tasks, at(10)));
    assert!(!worker.is_active_at(&snapshot.tasks, at(200)));
}
