//! A2A (Agent-to-Agent) protocol support for Switchboard
//!
//! Provides the wire types, the HTTP client the orchestrator uses to reach
//! adapters, and an adapter server that exposes any [`AgentBackend`] over
//! the same protocol.

pub mod backend;
pub mod client;
pub mod protocol;
pub mod server;

pub use backend::{AgentBackend, EchoBackend};
pub use client::A2aClient;
pub use protocol::{AgentCard, ErrorResponse, MessageRequest, MessageResponse, RemoteStatus};
pub use server::AdapterServer;
