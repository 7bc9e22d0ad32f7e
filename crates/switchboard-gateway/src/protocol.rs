//! Gateway HTTP protocol — JSON bodies between clients and the orchestrator

use serde::{Deserialize, Serialize};

use switchboard_core::{AgentCard, OrchestratorError};

/// Client → Gateway task submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// Missing and blank are both rejected as `EMPTY_QUERY`
    #[serde(default)]
    pub query: String,
    /// Explicit target; omit or leave blank for auto-selection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    /// Conversation id forwarded to the adapter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
}

/// Agent as listed by `GET /agents`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub capabilities: Vec<String>,
    pub endpoint: String,
}

impl From<AgentCard> for AgentSummary {
    fn from(card: AgentCard) -> Self {
        let capabilities = card.tags().into_iter().map(String::from).collect();
        Self {
            name: card.name,
            description: card.description,
            capabilities,
            endpoint: card.endpoint,
        }
    }
}

/// `GET /` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootInfo {
    pub name: String,
    pub description: String,
    pub agents: Vec<String>,
}

/// `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub agents: usize,
    pub tasks: usize,
}

/// Error body for every non-2xx gateway response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

// ── Error codes ──

pub const ERR_EMPTY_QUERY: &str = "EMPTY_QUERY";
pub const ERR_UNKNOWN_AGENT: &str = "UNKNOWN_AGENT";
pub const ERR_NO_SUITABLE_AGENT: &str = "NO_SUITABLE_AGENT";
pub const ERR_TASK_NOT_FOUND: &str = "TASK_NOT_FOUND";
pub const ERR_DUPLICATE_AGENT: &str = "DUPLICATE_AGENT";
pub const ERR_INVALID_REQUEST: &str = "INVALID_REQUEST";
pub const ERR_INTERNAL: &str = "INTERNAL";

/// Stable code for an orchestrator error
pub fn error_code(err: &OrchestratorError) -> &'static str {
    match err {
        OrchestratorError::EmptyQuery => ERR_EMPTY_QUERY,
        OrchestratorError::UnknownAgent { .. } => ERR_UNKNOWN_AGENT,
        OrchestratorError::NoSuitableAgent => ERR_NO_SUITABLE_AGENT,
        OrchestratorError::TaskNotFound(_) => ERR_TASK_NOT_FOUND,
        OrchestratorError::DuplicateAgent(_) => ERR_DUPLICATE_AGENT,
        _ => ERR_INTERNAL,
    }
}
