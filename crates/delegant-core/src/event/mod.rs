//! Backend event channel: topics, payload decoding, and the subscription traits.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::agent::{ActionEntry, ActionKind, Cursor};
use crate::error::{DelegantError, Result};

/// Named event channels the backend publishes on.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum EventTopic {
    AgentStatusChanged,
    ScreenshotUpdated,
    ActionExecuted,
    AgentThinking,
    AgentMessage,
    CursorMoved,
    EstimatedTime,
}

impl EventTopic {
    pub fn all() -> impl Iterator<Item = EventTopic> {
        EventTopic::iter()
    }
}

/// Agent lifecycle change carried by `agent-status-changed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
    Idle,
    Running,
    /// Terminal failure with the backend's message.
    Error(String),
}

impl StatusChange {
    /// Parses `"idle"`, `"running"` or `"error:<message>"`.
    ///
    /// The message is everything after the colon, whitespace included.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "idle" => Some(StatusChange::Idle),
            "running" => Some(StatusChange::Running),
            _ => raw
                .strip_prefix("error:")
                .map(|message| StatusChange::Error(message.to_string())),
        }
    }

    pub fn as_wire(&self) -> String {
        match self {
            StatusChange::Idle => "idle".to_string(),
            StatusChange::Running => "running".to_string(),
            StatusChange::Error(message) => format!("error:{}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenshotPayload {
    pub base64: String,
    #[serde(alias = "w", default)]
    pub width: u32,
    #[serde(alias = "h", default)]
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPayload {
    pub action_type: String,
    pub description: String,
    pub timestamp: String,
    pub iteration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl ActionPayload {
    /// Materializes the payload as a session entry with a fresh id.
    pub fn into_entry(self) -> ActionEntry {
        ActionEntry::new(
            ActionKind::from(self.action_type),
            self.description,
            self.timestamp,
            self.iteration,
            self.output,
        )
    }
}

#[derive(Debug, Deserialize)]
struct TextPayload {
    text: String,
}

#[derive(Debug, Deserialize)]
struct EstimatedTimePayload {
    seconds_remaining: u32,
}

/// A decoded backend event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    StatusChanged(StatusChange),
    Screenshot(ScreenshotPayload),
    ActionExecuted(ActionPayload),
    Thinking(String),
    Message(String),
    CursorMoved(Cursor),
    EstimatedTime(u32),
}

impl BackendEvent {
    /// Decodes a raw payload received on `topic`.
    pub fn decode(topic: EventTopic, payload: Value) -> Result<Self> {
        let event = match topic {
            EventTopic::AgentStatusChanged => {
                let raw = payload.as_str().ok_or_else(|| {
                    decode_error(topic, format!("expected a string, got {}", payload))
                })?;
                let change = StatusChange::parse(raw)
                    .ok_or_else(|| decode_error(topic, format!("unknown agent status '{}'", raw)))?;
                BackendEvent::StatusChanged(change)
            }
            EventTopic::ScreenshotUpdated => BackendEvent::Screenshot(serde_json::from_value(payload)?),
            EventTopic::ActionExecuted => {
                BackendEvent::ActionExecuted(serde_json::from_value(payload)?)
            }
            EventTopic::AgentThinking => {
                BackendEvent::Thinking(serde_json::from_value::<TextPayload>(payload)?.text)
            }
            EventTopic::AgentMessage => {
                BackendEvent::Message(serde_json::from_value::<TextPayload>(payload)?.text)
            }
            EventTopic::CursorMoved => BackendEvent::CursorMoved(serde_json::from_value(payload)?),
            EventTopic::EstimatedTime => BackendEvent::EstimatedTime(
                serde_json::from_value::<EstimatedTimePayload>(payload)?.seconds_remaining,
            ),
        };
        Ok(event)
    }

    pub fn topic(&self) -> EventTopic {
        match self {
            BackendEvent::StatusChanged(_) => EventTopic::AgentStatusChanged,
            BackendEvent::Screenshot(_) => EventTopic::ScreenshotUpdated,
            BackendEvent::ActionExecuted(_) => EventTopic::ActionExecuted,
            BackendEvent::Thinking(_) => EventTopic::AgentThinking,
            BackendEvent::Message(_) => EventTopic::AgentMessage,
            BackendEvent::CursorMoved(_) => EventTopic::CursorMoved,
            BackendEvent::EstimatedTime(_) => EventTopic::EstimatedTime,
        }
    }

    /// Wire payload as the backend emits it.
    pub fn to_payload(&self) -> Value {
        match self {
            BackendEvent::StatusChanged(change) => Value::String(change.as_wire()),
            BackendEvent::Screenshot(shot) => {
                json!({"base64": shot.base64, "w": shot.width, "h": shot.height})
            }
            BackendEvent::ActionExecuted(action) => json!(action),
            BackendEvent::Thinking(text) | BackendEvent::Message(text) => json!({"text": text}),
            BackendEvent::CursorMoved(cursor) => json!({"x": cursor.x, "y": cursor.y}),
            BackendEvent::EstimatedTime(seconds) => json!({"seconds_remaining": seconds}),
        }
    }
}

fn decode_error(topic: EventTopic, message: String) -> DelegantError {
    DelegantError::Serialization {
        format: format!("{} payload", topic),
        message,
    }
}

/// One line of a recorded event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub topic: EventTopic,
    pub payload: Value,
}

/// Callback invoked with each raw payload on a topic.
pub type EventHandler = Arc<dyn Fn(Value) + Send + Sync>;

/// Detach handle returned by [`EventSource::listen`].
///
/// Detaching consumes the handle, so a subscription cannot be released twice.
pub trait Unlisten: Send {
    fn unlisten(self: Box<Self>);
}

/// Subscription side of the backend event channel.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Registers `handler` on `topic`. The handle resolves asynchronously.
    async fn listen(&self, topic: EventTopic, handler: EventHandler) -> Result<Box<dyn Unlisten>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_topic_names() {
        assert_eq!(EventTopic::AgentStatusChanged.to_string(), "agent-status-changed");
        assert_eq!(
            EventTopic::from_str("estimated-time").unwrap(),
            EventTopic::EstimatedTime
        );
        assert_eq!(EventTopic::all().count(), 7);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(StatusChange::parse("idle"), Some(StatusChange::Idle));
        assert_eq!(StatusChange::parse("running"), Some(StatusChange::Running));
        assert_eq!(
            StatusChange::parse("error:disk full"),
            Some(StatusChange::Error("disk full".into()))
        );
        assert_eq!(
            StatusChange::parse("error: disk full"),
            Some(StatusChange::Error(" disk full".into()))
        );
        assert_eq!(StatusChange::parse("error:"), Some(StatusChange::Error(String::new())));
        assert_eq!(StatusChange::parse("paused"), None);
        assert_eq!(StatusChange::parse("ERROR"), None);
    }

    #[test]
    fn test_decode_status_requires_string() {
        let err = BackendEvent::decode(EventTopic::AgentStatusChanged, json!({"status": "idle"}));
        assert!(err.is_err());
        let err = BackendEvent::decode(EventTopic::AgentStatusChanged, json!("sleeping"));
        assert!(err.is_err());
    }

    #[test]
    fn test_decode_screenshot_accepts_short_and_long_names() {
        let short = BackendEvent::decode(
            EventTopic::ScreenshotUpdated,
            json!({"base64": "AAA", "w": 1280, "h": 800}),
        )
        .unwrap();
        let long = BackendEvent::decode(
            EventTopic::ScreenshotUpdated,
            json!({"base64": "AAA", "width": 1280, "height": 800}),
        )
        .unwrap();
        assert_eq!(short, long);
    }

    #[test]
    fn test_decode_action() {
        let event = BackendEvent::decode(
            EventTopic::ActionExecuted,
            json!({
                "action_type": "bash",
                "description": "ls -la",
                "timestamp": "2026-03-01T10:00:00Z",
                "iteration": 3
            }),
        )
        .unwrap();
        let BackendEvent::ActionExecuted(payload) = event else {
            panic!("expected action");
        };
        let entry = payload.into_entry();
        assert_eq!(entry.kind, ActionKind::Shell);
        assert_eq!(entry.iteration, 3);
        assert_eq!(entry.output, None);
    }

    #[test]
    fn test_payload_round_trips_through_decode() {
        let events = [
            BackendEvent::StatusChanged(StatusChange::Error("boom".into())),
            BackendEvent::Thinking("hmm".into()),
            BackendEvent::CursorMoved(Cursor { x: 10, y: -4 }),
            BackendEvent::EstimatedTime(42),
        ];
        for event in events {
            let decoded = BackendEvent::decode(event.topic(), event.to_payload()).unwrap();
            assert_eq!(decoded, event);
        }
    }

    #[test]
    fn test_recorded_event_line() {
        let line = r#"{"topic":"agent-message","payload":{"text":"hi"}}"#;
        let recorded: RecordedEvent = serde_json::from_str(line).unwrap();
        assert_eq!(recorded.topic, EventTopic::AgentMessage);
    }
}
