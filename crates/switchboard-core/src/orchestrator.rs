//! Orchestrator — routing decisions and task bookkeeping
//!
//! Holds the registered agent cards in registration order, picks an agent for
//! each query, dispatches it through an [`AgentTransport`] and records the
//! outcome in the [`TaskRegistry`].

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::card::AgentCard;
use crate::config::Config;
use crate::error::{DispatchError, OrchestratorError, Result};
use crate::registry::TaskRegistry;
use crate::selection::{self, CapabilityScorer, Selection};
use crate::task::Task;
use crate::transport::{AgentReply, AgentTransport};

/// Tunables for dispatch and selection
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub dispatch_timeout: Duration,
    pub poll_interval: Duration,
    pub min_score: f32,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            dispatch_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(500),
            min_score: 0.0,
        }
    }
}

impl From<&Config> for OrchestratorSettings {
    fn from(config: &Config) -> Self {
        Self {
            dispatch_timeout: config.dispatch.timeout(),
            poll_interval: config.dispatch.poll_interval(),
            min_score: config.selection.min_score,
        }
    }
}

/// Returned by [`Orchestrator::submit`] before the agent has answered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub task_id: String,
    pub agent_name: String,
}

/// The routing and bookkeeping authority. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Orchestrator {
    agents: Arc<RwLock<Vec<AgentCard>>>,
    tasks: Arc<TaskRegistry>,
    transport: Arc<dyn AgentTransport>,
    scorer: Arc<dyn CapabilityScorer>,
    settings: OrchestratorSettings,
}

fn preview(text: &str) -> String {
    text.chars().take(80).collect()
}

impl Orchestrator {
    pub fn new(
        settings: OrchestratorSettings,
        transport: Arc<dyn AgentTransport>,
        scorer: Arc<dyn CapabilityScorer>,
    ) -> Self {
        Self {
            agents: Arc::new(RwLock::new(Vec::new())),
            tasks: Arc::new(TaskRegistry::new()),
            transport,
            scorer,
            settings,
        }
    }

    /// Build from config, using the keyword scorer it describes. Agents are not connected yet.
    pub fn from_config(config: &Config, transport: Arc<dyn AgentTransport>) -> Self {
        Self::new(
            OrchestratorSettings::from(config),
            transport,
            Arc::new(config.selection.scorer()),
        )
    }

    // ── Agents ──

    /// Add a card. Names are unique; registration order is the tie-break key.
    pub async fn register(&self, card: AgentCard) -> Result<()> {
        let mut agents = self.agents.write().await;
        if agents.iter().any(|a| a.name == card.name) {
            return Err(OrchestratorError::DuplicateAgent(card.name));
        }
        info!(
            "Registered agent: {} at {} (capabilities: {:?})",
            card.name,
            card.endpoint,
            card.tags()
        );
        agents.push(card);
        Ok(())
    }

    /// Fetch an adapter's card from `GET /` and register it
    pub async fn connect(&self, endpoint: &str) -> Result<AgentCard> {
        debug!("Fetching agent card from {}", endpoint);
        let mut card = self.transport.fetch_card(endpoint).await?;
        // The address we reached it at wins over whatever the card advertises
        card.endpoint = endpoint.trim_end_matches('/').to_string();
        self.register(card.clone()).await?;
        Ok(card)
    }

    /// Register every configured agent. Static entries register directly;
    /// the rest are discovered. Failures are logged and skipped.
    pub async fn connect_configured(&self, config: &Config) -> usize {
        let mut connected = 0;
        for entry in &config.agents {
            let outcome = match entry.static_card() {
                Some(card) => self.register(card).await,
                None => self.connect(&entry.endpoint).await.map(|_| ()),
            };
            match outcome {
                Ok(()) => connected += 1,
                Err(e) => warn!("Failed to connect to agent at {}: {}", entry.endpoint, e),
            }
        }
        info!(
            "Connected {}/{} configured agents",
            connected,
            config.agents.len()
        );
        connected
    }

    /// Registered cards in registration order
    pub async fn list_agents(&self) -> Vec<AgentCard> {
        self.agents.read().await.clone()
    }

    async fn find_agent(&self, name: &str) -> Result<AgentCard> {
        let agents = self.agents.read().await;
        agents
            .iter()
            .find(|a| a.name == name)
            .cloned()
            .ok_or_else(|| OrchestratorError::UnknownAgent {
                name: name.to_string(),
                available: agents.iter().map(|a| a.name.clone()).collect(),
            })
    }

    /// Auto-selection without creating a task
    pub async fn select_agent(&self, query: &str) -> Result<Selection> {
        let agents = self.agents.read().await;
        let picked = selection::select(
            self.scorer.as_ref(),
            query,
            agents.iter(),
            self.settings.min_score,
        )
        .ok_or(OrchestratorError::NoSuitableAgent)?;
        debug!(
            "Scorer '{}' picked {} (score {})",
            self.scorer.name(),
            picked.agent_name,
            picked.score
        );
        Ok(picked)
    }

    // ── Tasks ──

    /// Create a pending task and dispatch it in the background.
    ///
    /// Returns as soon as the task is recorded. Dispatch failures never
    /// surface here; they land on the task.
    pub async fn submit(&self, query: &str, agent_name: Option<&str>) -> Result<Submission> {
        self.submit_in_context(query, agent_name, None).await
    }

    /// [`submit`](Self::submit) under a caller-chosen conversation id, which
    /// is forwarded to the adapter with the message
    pub async fn submit_in_context(
        &self,
        query: &str,
        agent_name: Option<&str>,
        context_id: Option<&str>,
    ) -> Result<Submission> {
        let (submission, _handle) = self.spawn_task(query, agent_name, context_id).await?;
        Ok(submission)
    }

    /// Submit and wait for the terminal snapshot
    pub async fn delegate(&self, query: &str, agent_name: Option<&str>) -> Result<Task> {
        self.delegate_in_context(query, agent_name, None).await
    }

    pub async fn delegate_in_context(
        &self,
        query: &str,
        agent_name: Option<&str>,
        context_id: Option<&str>,
    ) -> Result<Task> {
        let (submission, handle) = self.spawn_task(query, agent_name, context_id).await?;
        if let Err(e) = handle.await {
            warn!("Dispatch worker for {} ended abnormally: {}", submission.task_id, e);
        }
        self.get_status(&submission.task_id).await
    }

    async fn spawn_task(
        &self,
        query: &str,
        agent_name: Option<&str>,
        context_id: Option<&str>,
    ) -> Result<(Submission, JoinHandle<()>)> {
        if query.trim().is_empty() {
            return Err(OrchestratorError::EmptyQuery);
        }

        // A blank name means "pick one for me"
        let agent_name = agent_name.map(str::trim).filter(|name| !name.is_empty());
        let context_id = context_id
            .map(str::trim)
            .filter(|ctx| !ctx.is_empty())
            .map(String::from);

        let card = match agent_name {
            Some(name) => self.find_agent(name).await?,
            None => {
                let picked = self.select_agent(query).await?;
                self.find_agent(&picked.agent_name).await?
            }
        };

        let task = self
            .tasks
            .create(Task::new(query, card.name.clone()).with_context(context_id))
            .await?;
        info!(
            "Task {} submitted to {}: {}",
            task.id,
            card.name,
            preview(query)
        );

        let submission = Submission {
            task_id: task.id.clone(),
            agent_name: card.name,
        };

        let this = self.clone();
        let task_id = task.id;
        let handle = tokio::spawn(async move {
            if let Err(e) = this.dispatch(&task_id).await {
                warn!("Dispatch of task {} aborted: {}", task_id, e);
            }
        });

        Ok((submission, handle))
    }

    /// Move a pending task through `in_progress` to its terminal state.
    ///
    /// Adapter failures and timeouts resolve the task to `failed` and are not
    /// returned as errors. Errors here mean the task is unknown or was already
    /// dispatched.
    pub async fn dispatch(&self, task_id: &str) -> Result<Task> {
        let task = self.tasks.update(task_id, |t| t.start()).await?;

        let outcome = match self.find_agent(&task.agent_name).await {
            Ok(card) => {
                let timeout = self.settings.dispatch_timeout;
                match tokio::time::timeout(timeout, self.run_to_completion(&card, &task)).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(DispatchError::Timeout(timeout)),
                }
            }
            Err(e) => Err(DispatchError::Transport(e.to_string())),
        };

        match outcome {
            Ok(result) => {
                info!("Task {} completed by {}", task.id, task.agent_name);
                self.tasks.update(&task.id, |t| t.complete(result)).await
            }
            Err(e) => {
                warn!("Task {} failed on {}: {}", task.id, task.agent_name, e);
                self.tasks.update(&task.id, |t| t.fail(e.to_string())).await
            }
        }
    }

    async fn run_to_completion(
        &self,
        card: &AgentCard,
        task: &Task,
    ) -> std::result::Result<String, DispatchError> {
        let mut reply = self.transport.send_message(card, task).await?;

        loop {
            match reply {
                AgentReply::Completed(text) => return Ok(text),
                AgentReply::Failed(error) => return Err(DispatchError::Agent(error)),
                AgentReply::Working => {
                    debug!("Task {} still working on {}, polling", task.id, card.name);
                    tokio::time::sleep(self.settings.poll_interval).await;
                    reply = self.transport.poll_task(card, &task.id).await?;
                }
            }
        }
    }

    /// Current snapshot of a task
    pub async fn get_status(&self, task_id: &str) -> Result<Task> {
        self.tasks.get(task_id).await
    }

    /// All tasks, oldest first
    pub async fn list_tasks(&self) -> Vec<Task> {
        self.tasks.list().await
    }

    pub async fn task_count(&self) -> usize {
        self.tasks.len().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::KeywordScorer;
    use crate::task::TaskStatus;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// Scripted adapter behaviour, keyed by agent name
    #[derive(Clone)]
    enum Behavior {
        Answer(String),
        AgentFails(String),
        Unreachable,
        /// Reply `working`, then complete after this many polls
        WorkingThen(usize, String),
        NeverFinishes,
        /// Hold the reply until the gate is notified
        Gated(Arc<Notify>, String),
    }

    #[derive(Default)]
    struct MockTransport {
        behaviors: Mutex<HashMap<String, Behavior>>,
        cards: Mutex<HashMap<String, AgentCard>>,
        polls: Mutex<HashMap<String, usize>>,
        sent: Mutex<Vec<(String, String)>>,
        contexts: Mutex<Vec<Option<String>>>,
    }

    impl MockTransport {
        fn with(self, agent: &str, behavior: Behavior) -> Self {
            self.behaviors
                .lock()
                .unwrap()
                .insert(agent.to_string(), behavior);
            self
        }

        fn with_card(self, endpoint: &str, card: AgentCard) -> Self {
            self.cards
                .lock()
                .unwrap()
                .insert(endpoint.to_string(), card);
            self
        }

        fn behavior(&self, agent: &str) -> Behavior {
            self.behaviors
                .lock()
                .unwrap()
                .get(agent)
                .cloned()
                .unwrap_or(Behavior::Unreachable)
        }
    }

    #[async_trait]
    impl AgentTransport for MockTransport {
        async fn fetch_card(&self, endpoint: &str) -> std::result::Result<AgentCard, DispatchError> {
            self.cards
                .lock()
                .unwrap()
                .get(endpoint)
                .cloned()
                .ok_or_else(|| DispatchError::Transport("connection refused".into()))
        }

        async fn send_message(
            &self,
            card: &AgentCard,
            task: &Task,
        ) -> std::result::Result<AgentReply, DispatchError> {
            self.sent
                .lock()
                .unwrap()
                .push((card.name.clone(), task.id.clone()));
            self.contexts.lock().unwrap().push(task.context_id.clone());
            match self.behavior(&card.name) {
                Behavior::Answer(text) => Ok(AgentReply::Completed(text)),
                Behavior::AgentFails(err) => Ok(AgentReply::Failed(err)),
                Behavior::Unreachable => Err(DispatchError::Transport(format!(
                    "error sending request for url ({}/messages): connection refused",
                    card.base_url()
                ))),
                Behavior::WorkingThen(..) | Behavior::NeverFinishes => Ok(AgentReply::Working),
                Behavior::Gated(gate, text) => {
                    gate.notified().await;
                    Ok(AgentReply::Completed(text))
                }
            }
        }

        async fn poll_task(
            &self,
            card: &AgentCard,
            task_id: &str,
        ) -> std::result::Result<AgentReply, DispatchError> {
            let count = {
                let mut polls = self.polls.lock().unwrap();
                let entry = polls.entry(task_id.to_string()).or_insert(0);
                *entry += 1;
                *entry
            };
            match self.behavior(&card.name) {
                Behavior::WorkingThen(n, text) if count >= n => Ok(AgentReply::Completed(text)),
                Behavior::WorkingThen(..) | Behavior::NeverFinishes => Ok(AgentReply::Working),
                _ => Err(DispatchError::Protocol("unexpected poll".into())),
            }
        }
    }

    fn fast_settings() -> OrchestratorSettings {
        OrchestratorSettings {
            dispatch_timeout: Duration::from_millis(500),
            poll_interval: Duration::from_millis(5),
            min_score: 0.0,
        }
    }

    async fn orchestrator(transport: MockTransport) -> Orchestrator {
        let orch = Orchestrator::new(
            fast_settings(),
            Arc::new(transport),
            Arc::new(KeywordScorer::new()),
        );
        orch.register(
            AgentCard::new("ResearchAgent", "http://localhost:8001").with_capability("search"),
        )
        .await
        .unwrap();
        orch.register(AgentCard::new("VideoAgent", "http://localhost:8002").with_capability("video"))
            .await
            .unwrap();
        orch
    }

    fn answering() -> MockTransport {
        MockTransport::default()
            .with("ResearchAgent", Behavior::Answer("research answer".into()))
            .with("VideoAgent", Behavior::Answer("video answer".into()))
    }

    async fn wait_terminal(orch: &Orchestrator, id: &str) -> Task {
        for _ in 0..200 {
            let task = orch.get_status(id).await.unwrap();
            if task.status.is_terminal() {
                return task;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("task {} never reached a terminal state", id);
    }

    #[tokio::test]
    async fn test_register_duplicate_fails() {
        let orch = orchestrator(answering()).await;
        let err = orch
            .register(AgentCard::new("VideoAgent", "http://elsewhere"))
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::DuplicateAgent(name) if name == "VideoAgent"));
        assert_eq!(orch.list_agents().await.len(), 2);
    }

    #[tokio::test]
    async fn test_list_agents_in_registration_order() {
        let orch = orchestrator(answering()).await;
        let names: Vec<String> = orch.list_agents().await.into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["ResearchAgent", "VideoAgent"]);
    }

    #[tokio::test]
    async fn test_auto_selection_scenario() {
        let orch = orchestrator(answering()).await;

        let research = orch
            .submit("What's new in quantum computing?", None)
            .await
            .unwrap();
        assert_eq!(research.agent_name, "ResearchAgent");

        let video = orch
            .submit("Analyze this YouTube video: https://youtu.be/abc123", None)
            .await
            .unwrap();
        assert_eq!(video.agent_name, "VideoAgent");

        let done = wait_terminal(&orch, &video.task_id).await;
        assert_eq!(done.status, TaskStatus::Completed);
        assert_eq!(done.result.as_deref(), Some("video answer"));
    }

    #[tokio::test]
    async fn test_explicit_agent_overrides_selection() {
        let orch = orchestrator(answering()).await;
        let sub = orch
            .submit("Search the latest research papers", Some("VideoAgent"))
            .await
            .unwrap();
        assert_eq!(sub.agent_name, "VideoAgent");
        let task = orch.get_status(&sub.task_id).await.unwrap();
        assert_eq!(task.agent_name, "VideoAgent");
    }

    #[tokio::test]
    async fn test_blank_agent_name_auto_selects() {
        let orch = orchestrator(answering()).await;
        for blank in ["", "   "] {
            let sub = orch
                .submit("Analyze this YouTube video", Some(blank))
                .await
                .unwrap();
            assert_eq!(sub.agent_name, "VideoAgent");
        }
    }

    #[tokio::test]
    async fn test_context_id_forwarded_to_adapter() {
        let transport = Arc::new(answering());
        let orch = Orchestrator::new(fast_settings(), transport.clone(), Arc::new(KeywordScorer::new()));
        orch.register(AgentCard::new("VideoAgent", "http://v").with_capability("video"))
            .await
            .unwrap();

        let task = orch
            .delegate_in_context("video", None, Some("conv-42"))
            .await
            .unwrap();
        assert_eq!(task.context_id.as_deref(), Some("conv-42"));

        let plain = orch.delegate("video", None).await.unwrap();
        assert!(plain.context_id.is_none());

        let contexts = transport.contexts.lock().unwrap().clone();
        assert_eq!(contexts, vec![Some("conv-42".to_string()), None]);
    }

    #[tokio::test]
    async fn test_unknown_agent_creates_no_task() {
        let orch = orchestrator(answering()).await;
        let err = orch.submit("hello", Some("GhostAgent")).await.unwrap_err();
        match err {
            OrchestratorError::UnknownAgent { name, available } => {
                assert_eq!(name, "GhostAgent");
                assert_eq!(available, vec!["ResearchAgent", "VideoAgent"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(orch.task_count().await, 0);
    }

    #[tokio::test]
    async fn test_no_suitable_agent_creates_no_task() {
        let orch = orchestrator(answering()).await;
        let err = orch.submit("zzz qqq xyzzy", None).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::NoSuitableAgent));
        assert_eq!(orch.task_count().await, 0);
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let orch = orchestrator(answering()).await;
        let err = orch.submit("   ", Some("VideoAgent")).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::EmptyQuery));
        assert_eq!(orch.task_count().await, 0);
    }

    #[tokio::test]
    async fn test_selection_deterministic_across_submissions() {
        let orch = orchestrator(answering()).await;
        let query = "find the latest video about rust";
        let first = orch.select_agent(query).await.unwrap();
        for _ in 0..20 {
            let sub = orch.submit(query, None).await.unwrap();
            assert_eq!(sub.agent_name, first.agent_name);
        }
    }

    #[tokio::test]
    async fn test_unreachable_adapter_fails_task_not_submission() {
        let transport = MockTransport::default()
            .with("ResearchAgent", Behavior::Unreachable)
            .with("VideoAgent", Behavior::Answer("ok".into()));
        let orch = orchestrator(transport).await;

        let sub = orch.submit("research quantum computing", None).await.unwrap();
        assert_eq!(sub.agent_name, "ResearchAgent");

        let task = wait_terminal(&orch, &sub.task_id).await;
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.result.is_none());
        let error = task.error.unwrap();
        assert!(error.starts_with("dispatch failure"), "{error}");

        // Still responsive afterwards
        let next = orch.submit("watch this video", None).await.unwrap();
        let next = wait_terminal(&orch, &next.task_id).await;
        assert_eq!(next.status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn test_agent_reported_failure() {
        let transport = MockTransport::default().with("VideoAgent", Behavior::AgentFails("quota exceeded".into()));
        let orch = orchestrator(transport).await;
        let task = orch.delegate("video please", Some("VideoAgent")).await.unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert_eq!(task.error.as_deref(), Some("agent error: quota exceeded"));
    }

    #[tokio::test]
    async fn test_delegate_returns_terminal_snapshot() {
        let orch = orchestrator(answering()).await;
        let task = orch.delegate("What is Rust?", None).await.unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.agent_name, "ResearchAgent");
        assert_eq!(task.result.as_deref(), Some("research answer"));
    }

    #[tokio::test]
    async fn test_polling_until_complete() {
        let transport = MockTransport::default().with("VideoAgent", Behavior::WorkingThen(3, "summary".into()));
        let orch = orchestrator(transport).await;
        let task = orch.delegate("summarize this video", None).await.unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.result.as_deref(), Some("summary"));
    }

    #[tokio::test]
    async fn test_timeout_resolves_to_failed() {
        let transport = MockTransport::default().with("VideoAgent", Behavior::NeverFinishes);
        let orch = Orchestrator::new(
            OrchestratorSettings {
                dispatch_timeout: Duration::from_millis(50),
                poll_interval: Duration::from_millis(5),
                min_score: 0.0,
            },
            Arc::new(transport),
            Arc::new(KeywordScorer::new()),
        );
        orch.register(AgentCard::new("VideoAgent", "http://v").with_capability("video"))
            .await
            .unwrap();

        let task = orch.delegate("video", None).await.unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.error.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_status_transitions_in_order() {
        let gate = Arc::new(Notify::new());
        let transport = MockTransport::default().with("VideoAgent", Behavior::Gated(gate.clone(), "late".into()));
        let orch = orchestrator(transport).await;

        let sub = orch.submit("video", None).await.unwrap();
        let first = orch.get_status(&sub.task_id).await.unwrap().status;
        assert!(matches!(first, TaskStatus::Pending | TaskStatus::InProgress));

        let mut seen_in_progress = false;
        for _ in 0..200 {
            if orch.get_status(&sub.task_id).await.unwrap().status == TaskStatus::InProgress {
                seen_in_progress = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        assert!(seen_in_progress);

        gate.notify_one();
        let done = wait_terminal(&orch, &sub.task_id).await;
        assert_eq!(done.status, TaskStatus::Completed);
        assert!(done.updated_at >= done.created_at);
    }

    #[tokio::test]
    async fn test_terminal_task_cannot_be_redispatched() {
        let orch = orchestrator(answering()).await;
        let task = orch.delegate("video", None).await.unwrap();
        assert_eq!(task.status, TaskStatus::Completed);

        let err = orch.dispatch(&task.id).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidTransition { .. }));
        let after = orch.get_status(&task.id).await.unwrap();
        assert_eq!(after, task);
    }

    #[tokio::test]
    async fn test_get_status_unknown_task() {
        let orch = orchestrator(answering()).await;
        let err = orch.get_status("does-not-exist").await.unwrap_err();
        assert!(matches!(err, OrchestratorError::TaskNotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_submissions_get_unique_ids() {
        let orch = orchestrator(answering()).await;
        let mut handles = Vec::new();
        for i in 0..64 {
            let orch = orch.clone();
            handles.push(tokio::spawn(async move {
                orch.submit(&format!("research topic {i}"), None).await.unwrap()
            }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap().task_id);
        }
        assert_eq!(ids.len(), 64);
        assert_eq!(orch.task_count().await, 64);
    }

    #[tokio::test]
    async fn test_one_message_per_submission() {
        let transport = Arc::new(answering());
        let orch = Orchestrator::new(fast_settings(), transport.clone(), Arc::new(KeywordScorer::new()));
        orch.register(AgentCard::new("VideoAgent", "http://v").with_capability("video"))
            .await
            .unwrap();

        let task = orch.delegate("video", None).await.unwrap();
        let sent = transport.sent.lock().unwrap().clone();
        assert_eq!(sent, vec![("VideoAgent".to_string(), task.id)]);
    }

    #[tokio::test]
    async fn test_connect_fetches_and_registers_card() {
        let advertised = AgentCard::new("PodcastAgent", "http://advertised:9000").with_capability("podcast");
        let transport = MockTransport::default().with_card("http://localhost:8003/", advertised);
        let orch = Orchestrator::new(fast_settings(), Arc::new(transport), Arc::new(KeywordScorer::new()));

        let card = orch.connect("http://localhost:8003/").await.unwrap();
        assert_eq!(card.name, "PodcastAgent");
        assert_eq!(card.endpoint, "http://localhost:8003");
        assert_eq!(orch.list_agents().await, vec![card]);
    }

    #[tokio::test]
    async fn test_connect_unreachable_is_dispatch_error() {
        let orch = Orchestrator::new(
            fast_settings(),
            Arc::new(MockTransport::default()),
            Arc::new(KeywordScorer::new()),
        );
        let err = orch.connect("http://127.0.0.1:1").await.unwrap_err();
        assert!(matches!(err, OrchestratorError::Dispatch(_)));
        assert!(orch.list_agents().await.is_empty());
    }

    #[tokio::test]
    async fn test_connect_configured_skips_failures() {
        let config = Config::from_toml(
            r#"
[[agents]]
endpoint = "http://localhost:8001"

[[agents]]
endpoint = "http://localhost:8002"
name = "VideoAgent"
capabilities = ["video"]
"#,
        )
        .unwrap();
        let orch = Orchestrator::from_config(&config, Arc::new(MockTransport::default()));
        let connected = orch.connect_configured(&config).await;
        assert_eq!(connected, 1);
        let names: Vec<String> = orch.list_agents().await.into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["VideoAgent"]);
    }
}
