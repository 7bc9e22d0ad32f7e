//! Outbound seam from the orchestrator to adapters

use async_trait::async_trait;

use crate::card::AgentCard;
use crate::error::DispatchError;
use crate::task::Task;

/// What an adapter said about a message
#[derive(Debug, Clone, PartialEq)]
pub enum AgentReply {
    /// Accepted, still running; poll for the outcome
    Working,
    Completed(String),
    Failed(String),
}

/// How the orchestrator talks to adapters.
///
/// Every failure, whatever the cause, surfaces as a [`DispatchError`] so the
/// orchestrator can record it on the task uniformly.
#[async_trait]
pub trait AgentTransport: Send + Sync {
    /// `GET /` on the adapter
    async fn fetch_card(&self, endpoint: &str) -> Result<AgentCard, DispatchError>;

    /// `POST /messages` with the task's id, query and context
    async fn send_message(&self, card: &AgentCard, task: &Task) -> Result<AgentReply, DispatchError>;

    /// `GET /tasks/{task_id}`
    async fn poll_task(&self, card: &AgentCard, task_id: &str) -> Result<AgentReply, DispatchError>;
}
