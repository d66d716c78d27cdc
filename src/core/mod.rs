//! Core domain models for the run read model.
//!
//! This module contains the read-only records delivered by the producing
//! system (tasks, messages, snapshots) and the dependency index built over
//! a snapshot's task set.

pub mod dag;
pub mod message;
pub mod snapshot;
pub mod task;

pub use dag::{DanglingReference, DependencyGraph, MirrorDivergence};
pub use message::{DuplicateGroup, Message, MessageId, MessageType};
pub use snapshot::{Snapshot, SnapshotId};
pub use task::{Priority, Task, TaskId, TaskStatus};
