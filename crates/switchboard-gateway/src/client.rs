//! Gateway client — submits queries to a running orchestrator and polls results

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use switchboard_core::{Submission, Task};

use crate::protocol::*;

/// HTTP client for the orchestrator API
#[derive(Clone)]
pub struct GatewayClient {
    http: Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Decode a success body, or surface the gateway's `{error, code}` body
    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<ApiError>(&body) {
                Ok(err) => format!("{} ({})", err.error, err.code),
                Err(_) => body,
            };
            return Err(anyhow!("HTTP {}: {}", status, detail));
        }
        resp.json().await.context("Failed to parse response")
    }

    /// Orchestrator identity and agent names
    pub async fn info(&self) -> Result<RootInfo> {
        let resp = self
            .http
            .get(self.url("/"))
            .send()
            .await
            .with_context(|| format!("Failed to connect to orchestrator at {}", self.base_url))?;
        Self::decode(resp).await
    }

    pub async fn list_agents(&self) -> Result<Vec<AgentSummary>> {
        let resp = self
            .http
            .get(self.url("/agents"))
            .send()
            .await
            .with_context(|| format!("Failed to connect to orchestrator at {}", self.base_url))?;
        Self::decode(resp).await
    }

    /// Submit a query; returns before the agent answers
    pub async fn submit(
        &self,
        query: &str,
        agent_name: Option<&str>,
        context_id: Option<&str>,
    ) -> Result<Submission> {
        let request = SubmitRequest {
            query: query.to_string(),
            agent_name: agent_name.map(String::from),
            context_id: context_id.map(String::from),
        };
        let resp = self
            .http
            .post(self.url("/tasks"))
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to connect to orchestrator at {}", self.base_url))?;
        let submission: Submission = Self::decode(resp).await?;
        debug!(
            "Task {} submitted to {}",
            submission.task_id, submission.agent_name
        );
        Ok(submission)
    }

    pub async fn get_task(&self, task_id: &str) -> Result<Task> {
        let resp = self
            .http
            .get(self.url(&format!("/tasks/{}", task_id)))
            .send()
            .await
            .with_context(|| format!("Failed to poll task {}", task_id))?;
        Self::decode(resp).await
    }

    /// Poll until the task is completed or failed
    pub async fn wait_for_task(
        &self,
        task_id: &str,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<Task> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let task = self.get_task(task_id).await?;
            if task.status.is_terminal() {
                return Ok(task);
            }
            if tokio::time::Instant::now() > deadline {
                return Err(anyhow!(
                    "Task {} still {} after {:?}",
                    task_id,
                    task.status,
                    timeout
                ));
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}
