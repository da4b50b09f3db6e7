//! Task protocol data model.
//!
//! Wire shapes for the structured task protocol: a task carries a status
//! with an optional message, and messages are composed of typed parts
//! (free text and structured data). Unknown task states decode to
//! [`TaskState::Unknown`] rather than failing; unknown part types fail
//! decoding, which the request path treats as a pass-through condition.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    Submitted,
    Working,
    InputRequired,
    Completed,
    Canceled,
    Failed,
    #[serde(other)]
    Unknown,
}

/// Originator of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

/// One typed segment of a message body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Part {
    /// Free text.
    Text { text: String },
    /// Structured data.
    Data { data: Map<String, Value> },
}

impl Part {
    /// Builds a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    /// Builds a data part.
    pub fn data(data: Map<String, Value>) -> Self {
        Part::Data { data }
    }
}

/// A message exchanged over the task protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Message {
    /// Builds an agent-role message.
    pub fn agent(parts: Vec<Part>) -> Self {
        Message {
            role: Role::Agent,
            parts,
        }
    }

    /// The free text of the message: every text part joined with single
    /// spaces, in part order, trimmed.
    pub fn joined_text(&self) -> String {
        let texts: Vec<&str> = self
            .parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                Part::Data { .. } => None,
            })
            .collect();
        texts.join(" ").trim().to_string()
    }
}

/// Status block of a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub state: TaskState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// A task as carried on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl Task {
    /// The wire id, or a generated placeholder when it is empty.
    pub fn id_or_placeholder(&self) -> String {
        if self.id.is_empty() {
            generated_task_id()
        } else {
            self.id.clone()
        }
    }
}

/// Generates a placeholder id for tasks that arrive without one.
pub fn generated_task_id() -> String {
    format!("task-{}", Uuid::new_v4())
}

/// The current instant in RFC3339 form, seconds precision, UTC.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
