//! Core domain types and error definitions for the relay.
//!
//! This crate defines the types shared across the relay workspace:
//!
//! - [`RelayError`] — Error taxonomy for the chat orchestration path
//! - [`RunStatus`] and [`Run`] — Remote run lifecycle as reported by the
//!   agent service
//! - [`RunHandle`] — The thread/run identifier pair for one orchestration
//! - [`ThreadMessage`] and [`MessageContent`] — Messages produced by a
//!   completed run

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while relaying a chat message to the agent service.
#[derive(Error, Debug)]
pub enum RelayError {
    /// The inbound request was rejected before any upstream call.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The remote run reached a terminal status other than `completed`.
    #[error("run ended with status {status}")]
    RunFailed { status: RunStatus },

    /// The remote run did not reach a terminal status within the deadline.
    #[error("run did not complete within {waited_secs}s")]
    RunTimeout { waited_secs: u64 },

    /// Transport, auth, or decode failure talking to the agent service.
    #[error("agent service error: {0}")]
    Upstream(String),
}

/// Status of a remote run.
///
/// The service vocabulary is open-ended; statuses this crate does not know
/// about decode into [`RunStatus::Other`] and are treated as non-terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Completed,
    Failed,
    Cancelled,
    Expired,
    Other(String),
}

impl RunStatus {
    /// Returns true once the service will report no further state change.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled | Self::Expired)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::RequiresAction => "requires_action",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for RunStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "queued" => Self::Queued,
            "in_progress" => Self::InProgress,
            "requires_action" => Self::RequiresAction,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            "cancelled" => Self::Cancelled,
            "expired" => Self::Expired,
            _ => Self::Other(s),
        }
    }
}

impl From<RunStatus> for String {
    fn from(status: RunStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The thread/run identifier pair for a single orchestration call.
///
/// Both ids are opaque strings issued by the agent service. A handle is
/// created per inbound chat request and never reused or shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunHandle {
    pub thread_id: String,
    pub run_id: String,
}

/// A run object as returned by the agent service.
#[derive(Debug, Clone, Deserialize)]
pub struct Run {
    pub id: String,
    pub thread_id: String,
    pub status: RunStatus,
}

impl Run {
    pub fn handle(&self) -> RunHandle {
        RunHandle {
            thread_id: self.thread_id.clone(),
            run_id: self.id.clone(),
        }
    }
}

/// Author of a thread message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One content part of a thread message.
///
/// The wire shape is type-tagged; parts other than `text` are preserved as
/// [`MessageContent::Unsupported`] so a message that leads with an image or
/// tool output still decodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: MessageText },
    #[serde(other)]
    Unsupported,
}

impl MessageContent {
    /// The text payload, if this part is text-kind.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(&text.value),
            Self::Unsupported => None,
        }
    }
}

/// Text payload of a content part. Annotations are not modeled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageText {
    pub value: String,
}

/// A message in a thread, as listed after a completed run.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    pub role: MessageRole,
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_decodes_known_and_unknown_values() {
        let status: RunStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(status, RunStatus::InProgress);

        let status: RunStatus = serde_json::from_str("\"rate_limited\"").unwrap();
        assert_eq!(status, RunStatus::Other("rate_limited".into()));
        assert!(!status.is_terminal());
    }

    #[test]
    fn terminal_classification() {
        for s in ["completed", "failed", "cancelled", "expired"] {
            assert!(RunStatus::from(s.to_string()).is_terminal(), "{s}");
        }
        for s in ["queued", "in_progress", "requires_action"] {
            assert!(!RunStatus::from(s.to_string()).is_terminal(), "{s}");
        }
    }

    #[test]
    fn message_decodes_text_and_unsupported_parts() {
        let json = r#"{
            "id": "msg_1",
            "role": "assistant",
            "content": [
                {"type": "image_file", "image_file": {"file_id": "f_1"}},
                {"type": "text", "text": {"value": "hello", "annotations": []}}
            ]
        }"#;

        let msg: ThreadMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.content.len(), 2);
        assert!(msg.content[0].as_text().is_none());
        assert_eq!(msg.content[1].as_text(), Some("hello"));
    }

    #[test]
    fn run_failed_error_carries_status() {
        let err = RelayError::RunFailed { status: RunStatus::Cancelled };
        assert_eq!(err.to_string(), "run ended with status cancelled");
    }
}
