pub mod agent;
pub mod config;
pub mod core;
pub mod error;
pub mod log;

// Time-travel and analysis over a snapshot
pub mod actors;
pub mod diagnostics;
pub mod timeline;
pub mod view;

pub use agent::{active_agents_at, Agent, AgentId, AgentStats};
pub use config::Config;
pub use crate::core::{Message, MessageType, Snapshot, Task, TaskId, TaskStatus};
pub use diagnostics::{analyze, score, DiagnosticIssue, HealthMetrics, Severity};
pub use error::{Error, Result};
pub use timeline::{resolve, to_display, to_linear, TaskState};
pub use view::{Dashboard, Frame};
