//! A2A (Agent-to-Agent) wire types between the orchestrator and adapters
//!
//! `GET /` returns an [`AgentCard`], `POST /messages` takes a
//! [`MessageRequest`] and both `POST /messages` and `GET /tasks/{id}` answer
//! with a [`MessageResponse`]. Only `status` and the matching `result` or
//! `error` are required in a reply; the rest is bookkeeping the bundled
//! adapter server adds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use switchboard_core::{AgentReply, DispatchError};

pub use switchboard_core::{AgentCard, AgentSkill};

/// Message submission request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRequest {
    #[serde(default)]
    pub query: String,
    /// Orchestrator task id; the adapter generates one when empty
    #[serde(default)]
    pub task_id: String,
    /// Conversation id, echoed back by the adapter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
}

/// Adapter-side task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteStatus {
    Working,
    Completed,
    Failed,
}

impl std::fmt::Display for RemoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Working => write!(f, "working"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Adapter reply to a message or a status poll
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub task_id: String,
    pub status: RemoteStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl MessageResponse {
    pub fn working(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            status: RemoteStatus::Working,
            result: None,
            error: None,
            context_id: None,
            created_at: Some(Utc::now()),
            completed_at: None,
        }
    }

    pub fn in_context(mut self, context_id: Option<String>) -> Self {
        self.context_id = context_id;
        self
    }

    pub fn completed(mut self, result: impl Into<String>) -> Self {
        self.status = RemoteStatus::Completed;
        self.result = Some(result.into());
        self.error = None;
        self.completed_at = Some(Utc::now());
        self
    }

    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.status = RemoteStatus::Failed;
        self.error = Some(error.into());
        self.result = None;
        self.completed_at = Some(Utc::now());
        self
    }

    /// Convert to the orchestrator's view, rejecting replies that break the contract
    pub fn into_reply(self) -> Result<AgentReply, DispatchError> {
        match self.status {
            RemoteStatus::Working => Ok(AgentReply::Working),
            RemoteStatus::Completed => self
                .result
                .map(AgentReply::Completed)
                .ok_or_else(|| DispatchError::Protocol("completed reply without a result".into())),
            RemoteStatus::Failed => Ok(AgentReply::Failed(
                self.error.unwrap_or_else(|| "unspecified agent failure".to_string()),
            )),
        }
    }
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
