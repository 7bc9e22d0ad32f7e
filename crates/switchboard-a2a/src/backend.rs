//! Agent backends — the native logic an adapter wraps

use anyhow::Result;
use async_trait::async_trait;

/// An agent implementation behind an adapter
#[async_trait]
pub trait AgentBackend: Send + Sync {
    /// Answer a query. Errors become a `failed` reply, not an HTTP error.
    async fn run(&self, query: &str) -> Result<String>;
}

/// Replies with the query, optionally prefixed. Useful for wiring checks.
#[derive(Debug, Clone, Default)]
pub struct EchoBackend {
    prefix: String,
}

impl EchoBackend {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl AgentBackend for EchoBackend {
    async fn run(&self, query: &str) -> Result<String> {
        Ok(format!("{}{}", self.prefix, query))
    }
}
