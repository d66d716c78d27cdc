//! Messages exchanged between the coordinator and workers.
//!
//! Besides the record type this module holds the pure helpers the message
//! panel needs: visibility at an instant, reply threads, duplicate groups
//! and the agent communication graph.

use crate::agent::AgentId;
use crate::core::task::TaskId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Identifier of a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Instruction,
    Question,
    Answer,
    #[default]
    StatusUpdate,
    Blocker,
    TaskAssignment,
    /// Any type this crate does not interpret.
    #[serde(other)]
    Other,
}

fn system_agent() -> AgentId {
    AgentId::from("system")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub timestamp: DateTime<Utc>,
    /// Free-form content.
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: MessageType,
    #[serde(default = "system_agent")]
    pub from_agent_id: AgentId,
    #[serde(default = "system_agent")]
    pub to_agent_id: AgentId,
    #[serde(default)]
    pub task_id: Option<TaskId>,
    #[serde(default)]
    pub parent_message_id: Option<MessageId>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Message {
    pub fn new(
        id: &str,
        timestamp: DateTime<Utc>,
        kind: MessageType,
        from: impl Into<AgentId>,
        to: impl Into<AgentId>,
    ) -> Self {
        Self {
            id: MessageId::from(id),
            timestamp,
            message: String::new(),
            kind,
            from_agent_id: from.into(),
            to_agent_id: to.into(),
            task_id: None,
            parent_message_id: None,
            metadata: serde_json::Map::new(),
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.message = text.to_string();
        self
    }

    pub fn with_task(mut self, task: impl Into<TaskId>) -> Self {
        self.task_id = Some(task.into());
        self
    }

    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent_message_id = Some(MessageId::from(parent));
        self
    }

    pub fn with_metadata(mut self, key: &str, value: serde_json::Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    /// Blocker messages, or any message flagged `blocking: true`.
    pub fn is_blocking(&self) -> bool {
        self.kind == MessageType::Blocker
            || self
                .metadata
                .get("blocking")
                .and_then(|v| v.as_bool())
                .unwrap_or(false)
    }

    /// Numeric `progress` reported in the metadata bag.
    pub fn progress(&self) -> Option<f64> {
        self.metadata.get("progress").and_then(|v| v.as_f64())
    }

    /// Response latency in milliseconds (`latency_ms`, or `response_time` in seconds).
    pub fn response_latency_ms(&self) -> Option<f64> {
        if let Some(ms) = self.metadata.get("latency_ms").and_then(|v| v.as_f64()) {
            return Some(ms);
        }
        self.metadata
            .get("response_time")
            .and_then(|v| v.as_f64())
            .map(|secs| secs * 1000.0)
    }
}

/// Messages sent at or before `instant`, oldest first.
pub fn messages_until(messages: &[Message], instant: DateTime<Utc>) -> Vec<&Message> {
    let mut visible: Vec<&Message> = messages.iter().filter(|m| m.timestamp <= instant).collect();
    visible.sort_by_key(|m| m.timestamp);
    visible
}

/// Direct replies to `parent`, oldest first.
pub fn thread_children<'a>(messages: &'a [Message], parent: &MessageId) -> Vec<&'a Message> {
    let mut children: Vec<&Message> = messages
        .iter()
        .filter(|m| m.parent_message_id.as_ref() == Some(parent))
        .collect();
    children.sort_by_key(|m| m.timestamp);
    children
}

/// Walk `parent_message_id` links up to the thread root.
///
/// Stops at a missing parent or when a link loops back; returns `None` only
/// when `id` itself is unknown.
pub fn thread_root<'a>(messages: &'a [Message], id: &MessageId) -> Option<&'a Message> {
    let by_id: HashMap<&MessageId, &Message> = messages.iter().map(|m| (&m.id, m)).collect();
    let mut current = *by_id.get(id)?;
    let mut seen: HashSet<&MessageId> = HashSet::from([&current.id]);

    while let Some(parent) = current
        .parent_message_id
        .as_ref()
        .and_then(|p| by_id.get(p).copied())
    {
        if !seen.insert(&parent.id) {
            break;
        }
        current = parent;
    }
    Some(current)
}

/// Sender to receivers.
pub fn communication_graph(messages: &[Message]) -> BTreeMap<AgentId, BTreeSet<AgentId>> {
    let mut graph: BTreeMap<AgentId, BTreeSet<AgentId>> = BTreeMap::new();
    for message in messages {
        graph
            .entry(message.from_agent_id.clone())
            .or_default()
            .insert(message.to_agent_id.clone());
    }
    graph
}

/// A run of identical messages sent within a short window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateGroup {
    pub id: String,
    /// The earliest message of the run.
    pub original: MessageId,
    pub duplicates: Vec<MessageId>,
}

impl DuplicateGroup {
    /// Number of messages in the run, original included.
    pub fn size(&self) -> usize {
        self.duplicates.len() + 1
    }
}

/// Group messages with identical content, endpoints, task and type whose
/// timestamps fall within `window` of the run's first message.
pub fn detect_duplicates(messages: &[Message], window: Duration) -> Vec<DuplicateGroup> {
    type Key<'a> = (&'a str, &'a AgentId, &'a AgentId, Option<&'a TaskId>, MessageType);

    let mut buckets: BTreeMap<Key<'_>, Vec<&Message>> = BTreeMap::new();
    for m in messages {
        let key = (
            m.message.as_str(),
            &m.from_agent_id,
            &m.to_agent_id,
            m.task_id.as_ref(),
            m.kind,
        );
        buckets.entry(key).or_default().push(m);
    }

    let mut groups = Vec::new();
    for mut bucket in buckets.into_values() {
        if bucket.len() < 2 {
            continue;
        }
        bucket.sort_by_key(|m| m.timestamp);

        let mut i = 0;
        while i < bucket.len() {
            let first = bucket[i];
            let mut j = i + 1;
            while j < bucket.len() && bucket[j].timestamp - first.timestamp <= window {
                j += 1;
            }
            if j - i > 1 {
                groups.push(DuplicateGroup {
                    id: String::new(),
                    original: first.id.clone(),
                    duplicates: bucket[i + 1..j].iter().map(|m| m.id.clone()).collect(),
                });
            }
            i = j;
        }
    }

    groups.sort_by(|a, b| a.original.cmp(&b.original));
    for (n, group) in groups.iter_mut().enumerate() {
        group.id = format!("dup_group_{}", n + 1);
    }
    groups
}
