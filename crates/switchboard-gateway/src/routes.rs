//! HTTP route handlers for the orchestrator API

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, info, warn};

use switchboard_core::{OrchestratorError, Submission, Task};

use crate::AppState;
use crate::protocol::*;

/// Failure rendered as an `{error, code}` response
pub enum RouteError {
    Orchestrator(OrchestratorError),
    /// Body that is not a JSON object of the expected shape
    InvalidBody(JsonRejection),
}

impl From<OrchestratorError> for RouteError {
    fn from(err: OrchestratorError) -> Self {
        Self::Orchestrator(err)
    }
}

impl From<JsonRejection> for RouteError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection)
    }
}

impl RouteError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Orchestrator(err) => match err {
                OrchestratorError::EmptyQuery => StatusCode::BAD_REQUEST,
                OrchestratorError::UnknownAgent { .. } | OrchestratorError::TaskNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                OrchestratorError::NoSuitableAgent => StatusCode::UNPROCESSABLE_ENTITY,
                OrchestratorError::DuplicateAgent(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn body(&self) -> ApiError {
        match self {
            Self::Orchestrator(err) => ApiError {
                error: err.to_string(),
                code: error_code(err).to_string(),
            },
            Self::InvalidBody(rejection) => ApiError {
                error: rejection.body_text(),
                code: ERR_INVALID_REQUEST.to_string(),
            },
        }
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.body();
        if status.is_server_error() {
            warn!("Request failed: {}", body.error);
        } else {
            debug!("Request rejected ({}): {}", status, body.error);
        }
        (status, Json(body)).into_response()
    }
}

/// `GET /`
pub async fn root(State(state): State<Arc<AppState>>) -> Json<RootInfo> {
    let agents = state
        .orchestrator
        .list_agents()
        .await
        .into_iter()
        .map(|card| card.name)
        .collect();
    Json(RootInfo {
        name: "Switchboard Orchestrator".to_string(),
        description: "Orchestrator that delegates tasks to specialized agents".to_string(),
        agents,
    })
}

/// `GET /health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        agents: state.orchestrator.list_agents().await.len(),
        tasks: state.orchestrator.task_count().await,
    })
}

/// `GET /agents`, in registration order
pub async fn list_agents(State(state): State<Arc<AppState>>) -> Json<Vec<AgentSummary>> {
    let agents = state
        .orchestrator
        .list_agents()
        .await
        .into_iter()
        .map(AgentSummary::from)
        .collect();
    Json(agents)
}

/// `POST /tasks`: returns as soon as the task is recorded
pub async fn submit_task(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Submission>), RouteError> {
    let Json(request) = payload?;
    info!(
        "Received query ({}): {}",
        request.agent_name.as_deref().unwrap_or("auto"),
        request.query.chars().take(50).collect::<String>()
    );
    let submission = state
        .orchestrator
        .submit_in_context(
            &request.query,
            request.agent_name.as_deref(),
            request.context_id.as_deref(),
        )
        .await?;
    Ok((StatusCode::ACCEPTED, Json(submission)))
}

/// `POST /delegate`: waits for the agent's answer
pub async fn delegate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Json<Task>, RouteError> {
    let Json(request) = payload?;
    let task = state
        .orchestrator
        .delegate_in_context(
            &request.query,
            request.agent_name.as_deref(),
            request.context_id.as_deref(),
        )
        .await?;
    Ok(Json(task))
}

/// `GET /tasks/{task_id}`
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, RouteError> {
    debug!("Getting status of task {}", task_id);
    Ok(Json(state.orchestrator.get_status(&task_id).await?))
}

/// `GET /tasks`
pub async fn list_tasks(State(state): State<Arc<AppState>>) -> Json<Vec<Task>> {
    Json(state.orchestrator.list_tasks().await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_error_status_mapping() {
        assert_eq!(
            RouteError::from(OrchestratorError::EmptyQuery).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RouteError::from(OrchestratorError::NoSuitableAgent).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            RouteError::from(OrchestratorError::TaskNotFound("t".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RouteError::from(OrchestratorError::UnknownAgent {
                name: "x".into(),
                available: vec![],
            })
            .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RouteError::from(OrchestratorError::DuplicateAgent("x".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            RouteError::from(OrchestratorError::DuplicateTaskId("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
