//! Live state of a running agent task.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// Lifecycle state of the agent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AgentStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Error,
}

/// Which tool produced an action.
///
/// Serialized as the backend's raw tool name so unknown tools round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    /// Screen pointer and keyboard synthesis (`computer`).
    Pointer,
    /// Shell command (`bash`).
    Shell,
    /// File edit (`text_editor`).
    FileEdit,
    Other(String),
}

impl ActionKind {
    pub fn as_str(&self) -> &str {
        match self {
            ActionKind::Pointer => "computer",
            ActionKind::Shell => "bash",
            ActionKind::FileEdit => "text_editor",
            ActionKind::Other(name) => name,
        }
    }
}

impl From<String> for ActionKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "computer" => ActionKind::Pointer,
            "bash" => ActionKind::Shell,
            "text_editor" => ActionKind::FileEdit,
            _ => ActionKind::Other(name),
        }
    }
}

impl From<&str> for ActionKind {
    fn from(name: &str) -> Self {
        ActionKind::from(name.to_string())
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One executed action. Immutable once appended to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEntry {
    pub id: Uuid,
    pub kind: ActionKind,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// ISO-8601 timestamp as reported by the backend.
    pub timestamp: String,
    pub iteration: u32,
}

impl ActionEntry {
    /// Creates an entry with a fresh id.
    pub fn new(
        kind: ActionKind,
        description: impl Into<String>,
        timestamp: impl Into<String>,
        iteration: u32,
        output: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            description: description.into(),
            output,
            timestamp: timestamp.into(),
            iteration,
        }
    }
}

/// Last reported pointer position in agent display coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cursor {
    pub x: i32,
    pub y: i32,
}

/// Snapshot of the agent session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AgentSession {
    pub status: AgentStatus,
    pub task: String,
    /// Append-only, in emission order.
    pub actions: Vec<ActionEntry>,
    /// Cleared whenever a new action lands.
    pub thinking: String,
    pub message: String,
    pub estimated_seconds: Option<u32>,
    /// Latest screenshot as base64.
    pub screenshot: Option<String>,
    pub cursor: Cursor,
}

impl AgentSession {
    /// Appends an action and clears the thinking text.
    pub fn push_action(&mut self, entry: ActionEntry) {
        self.actions.push(entry);
        self.thinking.clear();
    }

    /// Resets to the default tuple, then records a terminal error.
    pub fn fail(&mut self, message: impl Into<String>) {
        *self = Self::default();
        self.status = AgentStatus::Error;
        self.message = message.into();
    }

    pub fn is_running(&self) -> bool {
        self.status == AgentStatus::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_action_kind_maps_backend_tool_names() {
        assert_eq!(ActionKind::from("computer"), ActionKind::Pointer);
        assert_eq!(ActionKind::from("bash"), ActionKind::Shell);
        assert_eq!(ActionKind::from("text_editor"), ActionKind::FileEdit);
        assert_eq!(
            ActionKind::from("browser"),
            ActionKind::Other("browser".to_string())
        );
    }

    #[test]
    fn test_unknown_action_kind_keeps_raw_name() {
        let json = serde_json::to_string(&ActionKind::from("zoom")).unwrap();
        assert_eq!(json, "\"zoom\"");
        let kind: ActionKind = serde_json::from_str("\"bash\"").unwrap();
        assert_eq!(kind, ActionKind::Shell);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(AgentStatus::from_str("running").unwrap(), AgentStatus::Running);
        assert_eq!(AgentStatus::Error.to_string(), "error");
        assert!(AgentStatus::from_str("error:disk full").is_err());
    }

    #[test]
    fn test_push_action_clears_thinking() {
        let mut session = AgentSession {
            thinking: "pondering".into(),
            ..Default::default()
        };
        session.push_action(ActionEntry::new(
            ActionKind::Shell,
            "ls",
            "2026-01-01T00:00:00Z",
            1,
            Some("a.txt".into()),
        ));
        assert_eq!(session.actions.len(), 1);
        assert!(session.thinking.is_empty());
    }

    #[test]
    fn test_fail_resets_then_keeps_message() {
        let mut session = AgentSession {
            status: AgentStatus::Running,
            task: "open browser".into(),
            screenshot: Some("abc".into()),
            estimated_seconds: Some(12),
            ..Default::default()
        };
        session.fail("disk full");

        assert_eq!(session.status, AgentStatus::Error);
        assert_eq!(session.message, "disk full");
        assert!(session.task.is_empty());
        assert_eq!(session.screenshot, None);
        assert_eq!(session.estimated_seconds, None);
    }
}
