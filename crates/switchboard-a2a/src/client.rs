//! A2A client — the orchestrator's HTTP transport to adapters

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use switchboard_core::{AgentReply, AgentTransport, DispatchError, Task};

use crate::protocol::*;

/// Default per-request timeout, matching the orchestrator's dispatch budget
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for talking to adapters
#[derive(Clone)]
pub struct A2aClient {
    http: Client,
    timeout: Duration,
}

impl A2aClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, timeout })
    }

    fn map_send_error(&self, err: reqwest::Error) -> DispatchError {
        if err.is_timeout() {
            DispatchError::Timeout(self.timeout)
        } else {
            DispatchError::Transport(err.to_string())
        }
    }

    /// Turn a response into `T`, treating any non-2xx as a failure
    async fn decode<T: DeserializeOwned>(&self, resp: Response) -> Result<T, DispatchError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DispatchError::Status {
                status: status.as_u16(),
                body,
            });
        }
        resp.json::<T>()
            .await
            .map_err(|e| DispatchError::Protocol(e.to_string()))
    }

    /// Fetch an adapter's capability card
    pub async fn fetch_agent_card(&self, base_url: &str) -> Result<AgentCard, DispatchError> {
        let url = format!("{}/", base_url.trim_end_matches('/'));
        debug!("Fetching agent card from {}", url);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let card: AgentCard = self.decode(resp).await?;

        info!(
            "Fetched agent card: {} ({} capabilities)",
            card.name,
            card.capabilities.len()
        );
        Ok(card)
    }

    /// Send a message to an adapter
    pub async fn send_message(
        &self,
        base_url: &str,
        request: &MessageRequest,
    ) -> Result<MessageResponse, DispatchError> {
        let url = format!("{}/messages", base_url.trim_end_matches('/'));
        debug!("Sending task {} to {}", request.task_id, url);

        let resp = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let reply: MessageResponse = self.decode(resp).await?;

        debug!("Task {} acknowledged (status: {})", request.task_id, reply.status);
        Ok(reply)
    }

    /// Poll adapter-local task status
    pub async fn get_task_status(
        &self,
        base_url: &str,
        task_id: &str,
    ) -> Result<MessageResponse, DispatchError> {
        let url = format!("{}/tasks/{}", base_url.trim_end_matches('/'), task_id);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        self.decode(resp).await
    }
}

#[async_trait]
impl AgentTransport for A2aClient {
    async fn fetch_card(&self, endpoint: &str) -> Result<AgentCard, DispatchError> {
        self.fetch_agent_card(endpoint).await
    }

    async fn send_message(&self, card: &AgentCard, task: &Task) -> Result<AgentReply, DispatchError> {
        let request = MessageRequest {
            query: task.query.clone(),
            task_id: task.id.clone(),
            context_id: task.context_id.clone(),
        };
        A2aClient::send_message(self, card.base_url(), &request)
            .await?
            .into_reply()
    }

    async fn poll_task(&self, card: &AgentCard, task_id: &str) -> Result<AgentReply, DispatchError> {
        self.get_task_status(card.base_url(), task_id)
            .await?
            .into_reply()
    }
}
