//! Adapter server — puts an [`AgentBackend`] behind the A2A routes
//!
//! - `GET /` → agent card
//! - `POST /messages` → run the backend for a query
//! - `GET /tasks/{task_id}` → adapter-local status, for polling

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::backend::AgentBackend;
use crate::protocol::*;

struct AdapterState {
    card: AgentCard,
    backend: Arc<dyn AgentBackend>,
    tasks: RwLock<HashMap<String, MessageResponse>>,
    async_mode: bool,
}

/// HTTP front end for one agent
pub struct AdapterServer {
    card: AgentCard,
    backend: Arc<dyn AgentBackend>,
    async_mode: bool,
}

impl AdapterServer {
    pub fn new(card: AgentCard, backend: Arc<dyn AgentBackend>) -> Self {
        Self {
            card,
            backend,
            async_mode: false,
        }
    }

    /// Reply `working` right away and finish in the background
    pub fn with_async_mode(mut self, async_mode: bool) -> Self {
        self.async_mode = async_mode;
        self
    }

    pub fn card(&self) -> &AgentCard {
        &self.card
    }

    /// Router with a fresh task table
    pub fn router(&self) -> Router {
        let state = Arc::new(AdapterState {
            card: self.card.clone(),
            backend: self.backend.clone(),
            tasks: RwLock::new(HashMap::new()),
            async_mode: self.async_mode,
        });
        Router::new()
            .route("/", get(agent_card))
            .route("/messages", post(handle_message))
            .route("/tasks/{task_id}", get(get_task))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Bind and serve until the process exits
    pub async fn serve(&self, addr: SocketAddr) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(
            "Adapter '{}' listening on http://{}",
            self.card.name,
            listener.local_addr()?
        );
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

async fn agent_card(State(state): State<Arc<AdapterState>>) -> Json<AgentCard> {
    Json(state.card.clone())
}

async fn handle_message(
    State(state): State<Arc<AdapterState>>,
    Json(request): Json<MessageRequest>,
) -> Response {
    let query = request.query.trim().to_string();
    if query.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No text content in message");
    }

    let task_id = if request.task_id.trim().is_empty() {
        uuid::Uuid::new_v4().to_string()
    } else {
        request.task_id
    };

    let pending = MessageResponse::working(task_id.clone()).in_context(request.context_id);
    state
        .tasks
        .write()
        .await
        .insert(task_id.clone(), pending.clone());
    info!("Adapter '{}' accepted task {}", state.card.name, task_id);

    if state.async_mode {
        let state = state.clone();
        let accepted = pending.clone();
        tokio::spawn(async move {
            run_backend(&state, pending, &query).await;
        });
        return (StatusCode::OK, Json(accepted)).into_response();
    }

    let finished = run_backend(&state, pending, &query).await;
    (StatusCode::OK, Json(finished)).into_response()
}

async fn run_backend(state: &AdapterState, pending: MessageResponse, query: &str) -> MessageResponse {
    let task_id = pending.task_id.clone();
    let finished = match state.backend.run(query).await {
        Ok(text) => pending.completed(text),
        Err(e) => {
            warn!("Adapter '{}' task {} failed: {}", state.card.name, task_id, e);
            pending.failed(format!("Error: {}", e))
        }
    };
    state
        .tasks
        .write()
        .await
        .insert(task_id, finished.clone());
    finished
}

async fn get_task(
    State(state): State<Arc<AdapterState>>,
    Path(task_id): Path<String>,
) -> Response {
    match state.tasks.read().await.get(&task_id) {
        Some(task) => Json(task.clone()).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Task not found"),
    }
}
