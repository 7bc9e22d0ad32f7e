//! switchboard-gateway — HTTP API for the orchestrator
//!
//! # Endpoints
//!
//! - `GET /` - Orchestrator identity and agent names
//! - `GET /health` - Health check
//! - `GET /agents` - Registered agents, in registration order
//! - `POST /tasks` - Submit a query, returns `{task_id, agent_name}` immediately
//! - `GET /tasks` - All tasks
//! - `GET /tasks/{id}` - Task status and result
//! - `POST /delegate` - Submit and wait for the agent's answer

pub mod client;
pub mod protocol;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use client::GatewayClient;
pub use state::AppState;

/// Create the API router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/agents", get(routes::list_agents))
        .route("/tasks", post(routes::submit_task).get(routes::list_tasks))
        .route("/tasks/{task_id}", get(routes::get_task))
        .route("/delegate", post(routes::delegate))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve the API until `shutdown` resolves
pub async fn serve(
    state: Arc<AppState>,
    addr: SocketAddr,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Switchboard orchestrator listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Switchboard orchestrator stopped");
    Ok(())
}
