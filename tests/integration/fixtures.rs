//! Test fixtures for integration tests.
//!
//! Provides helpers for:
//! - Fixed timestamps relative to a run start
//! - Predefined task sets (chains, diamonds, the three-task example run)
//! - A JSON snapshot shaped like the producer's output

use chrono::{DateTime, Duration, TimeZone, Utc};

use cato::agent::Agent;
use cato::core::{Message, MessageType, Snapshot, Task, TaskStatus};

/// Run start used by every fixture.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 14, 0, 0).unwrap()
}

/// `t0() + minutes`.
pub fn at(minutes: i64) -> DateTime<Utc> {
    t0() + Duration::minutes(minutes)
}

/// An assigned task spanning `[from, to]` minutes.
pub fn window_task(id: &str, from: i64, to: i64, status: TaskStatus) -> Task {
    Task::new(id, &format!("Task {}", id), at(from))
        .with_updated_at(at(to))
        .with_status(status)
        .with_progress(if status == TaskStatus::Done { 100 } else { 40 })
        .with_agent("worker-1")
}

/// A -> B -> C where each task depends on the previous one.
pub fn chain(statuses: [TaskStatus; 3]) -> Vec<Task> {
    vec![
        window_task("A", 0, 10, statuses[0]),
        window_task("B", 10, 20, statuses[1]).with_dependencies(["A"]),
        window_task("C", 20, 30, statuses[2]).with_dependencies(["B"]),
    ]
}

/// Root with two branches joined by a sink.
pub fn diamond() -> Vec<Task> {
    vec![
        window_task("root", 0, 10, TaskStatus::Done).with_dependents(["left", "right"]),
        window_task("left", 10, 25, TaskStatus::Done)
            .with_dependencies(["root"])
            .with_dependents(["sink"]),
        window_task("right", 10, 20, TaskStatus::Done)
            .with_dependencies(["root"])
            .with_dependents(["sink"]),
        window_task("sink", 25, 40, TaskStatus::InProgress).with_dependencies(["left", "right"]),
    ]
}

/// A done, B todo waiting on A, C todo waiting on B only.
pub fn example_run() -> Vec<Task> {
    vec![
        Task::new("A", "Design schema", at(0))
            .with_updated_at(at(30))
            .with_status(TaskStatus::Done)
            .with_progress(100)
            .with_agent("worker-1")
            .with_dependents(["B"]),
        Task::new("B", "Build API", at(30))
            .with_updated_at(at(90))
            .with_dependencies(["A"])
            .with_dependents(["C"]),
        Task::new("C", "Write client", at(45))
            .with_updated_at(at(120))
            .with_dependencies(["B"]),
    ]
}

pub fn agents() -> Vec<Agent> {
    vec![
        Agent::new("coordinator", "Coordinator", "coordinator"),
        Agent::new("worker-1", "Worker One", "backend").with_current_tasks(["B"]),
        Agent::new("worker-2", "Worker Two", "frontend"),
    ]
}

pub fn messages() -> Vec<Message> {
    vec![
        Message::new("m1", at(0), MessageType::TaskAssignment, "coordinator", "worker-1")
            .with_text("Take task A")
            .with_task("A"),
        Message::new("m2", at(20), MessageType::StatusUpdate, "worker-1", "coordinator")
            .with_text("Schema drafted")
            .with_task("A")
            .with_metadata("progress", serde_json::json!(70)),
        Message::new("m3", at(50), MessageType::Blocker, "worker-1", "coordinator")
            .with_text("Waiting on credentials")
            .with_task("B"),
        Message::new("m4", at(55), MessageType::Answer, "coordinator", "worker-1")
            .with_text("Credentials sent")
            .with_parent("m3"),
    ]
}

pub fn example_snapshot() -> Snapshot {
    Snapshot::new(example_run(), agents(), messages())
}

/// A snapshot as the producer serializes it.
pub const SNAPSHOT_JSON: &str = r#"{
    "tasks": [
        {
            "id": "t-1", "name": "Set up database", "description": "Postgres schema",
            "status": "done", "priority": "high", "progress_percent": 100,
            "created_at": "2025-06-02T14:00:00Z", "started_at": "2025-06-02T14:05:00Z",
            "updated_at": "2025-06-02T14:40:00Z", "completed_at": "2025-06-02T14:40:00Z",
            "estimated_hours": 1.0, "actual_hours": 0.6,
            "assigned_agent_id": "worker-1",
            "dependency_ids": [], "dependent_task_ids": ["t-2", "t-3", "t-4"],
            "labels": ["backend"]
        },
        {
            "id": "t-2", "name": "Auth endpoints", "status": "in_progress", "progress_percent": 60,
            "created_at": "2025-06-02T14:10:00Z", "started_at": "2025-06-02T14:40:00Z",
            "updated_at": "2025-06-02T15:30:00Z",
            "assigned_agent_id": null,
            "dependency_ids": ["t-1"], "dependent_task_ids": []
        },
        {
            "id": "t-3", "name": "User endpoints", "status": "todo", "progress_percent": 0,
            "created_at": "2025-06-02T14:10:00Z", "updated_at": "2025-06-02T14:10:00Z",
            "assigned_agent_id": "worker-2",
            "dependency_ids": ["t-1", "t-2"], "dependent_task_ids": []
        },
        {
            "id": "t-4", "name": "Frontend shell", "status": "blocked", "progress_percent": 20,
            "created_at": "2025-06-02T14:15:00Z", "started_at": "2025-06-02T14:45:00Z",
            "updated_at": "2025-06-02T16:00:00Z",
            "assigned_agent_id": "worker-2",
            "dependency_ids": ["t-1", "t-9"], "dependent_task_ids": []
        }
    ],
    "agents": [
        {"id": "worker-1", "name": "Worker One", "role": "backend",
         "skills": ["python"], "current_task_ids": []},
        {"id": "worker-2", "name": "Worker Two", "role": "frontend",
         "current_task_ids": ["t-3", "t-4"]}
    ],
    "messages": [
        {"id": "m-1", "timestamp": "2025-06-02T14:00:00Z", "message": "Start t-1",
         "type": "task_assignment", "from_agent_id": "coordinator", "to_agent_id": "worker-1",
         "task_id": "t-1"},
        {"id": "m-2", "timestamp": "2025-06-02T14:50:00Z", "message": "Need API contract",
         "type": "blocker", "from_agent_id": "worker-2", "to_agent_id": "coordinator",
         "task_id": "t-4"},
        {"id": "m-3", "timestamp": "2025-06-02T14:50:01Z", "message": "Need API contract",
         "type": "blocker", "from_agent_id": "worker-2", "to_agent_id": "coordinator",
         "task_id": "t-4"}
    ],
    "start_time": "2025-06-02T14:00:00Z",
    "end_time": "2025-06-02T16:00:00Z"
}"#;
