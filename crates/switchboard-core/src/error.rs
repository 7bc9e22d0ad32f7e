//! Error types for the orchestrator

use std::time::Duration;

use thiserror::Error;

use crate::task::TaskStatus;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Agent '{0}' is already registered")]
    DuplicateAgent(String),

    #[error("Agent '{name}' not found. Available agents: {}", available.join(", "))]
    UnknownAgent { name: String, available: Vec<String> },

    #[error("No registered agent can handle this query")]
    NoSuitableAgent,

    #[error("Task '{0}' not found")]
    TaskNotFound(String),

    #[error("Query is required")]
    EmptyQuery,

    #[error("Task '{id}' cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: TaskStatus,
        to: TaskStatus,
    },

    #[error("Task id '{0}' is already in use")]
    DuplicateTaskId(String),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Failure talking to an adapter. Recorded on the task, never returned from `submit`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("dispatch failure: {0}")]
    Transport(String),

    #[error("dispatch failure: HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("dispatch failure: timed out after {0:?}")]
    Timeout(Duration),

    #[error("dispatch failure: malformed reply: {0}")]
    Protocol(String),

    #[error("agent error: {0}")]
    Agent(String),
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
