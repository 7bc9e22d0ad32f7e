//! switchboard-core — task delegation between an orchestrator and agent services
//!
//! The orchestrator receives a query, picks a registered agent (explicitly or
//! by capability scoring), dispatches the query over an [`AgentTransport`] and
//! tracks the resulting [`Task`] until the agent answers or the dispatch fails.
//!
//! ```text
//! Client ──submit──▶ Orchestrator ──select──▶ AgentCard
//!                        │
//!                        ├──create/update──▶ TaskRegistry
//!                        ▼
//!                  AgentTransport ──POST /messages──▶ Adapter
//! ```

pub mod card;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod registry;
pub mod selection;
pub mod task;
pub mod transport;

pub use card::{AgentCard, AgentSkill};
pub use config::{AgentEntry, Config, DispatchConfig, SelectionConfig, ServerConfig};
pub use error::{DispatchError, OrchestratorError, Result};
pub use orchestrator::{Orchestrator, OrchestratorSettings, Submission};
pub use registry::TaskRegistry;
pub use selection::{CapabilityScorer, KeywordScorer, Selection};
pub use task::{Task, TaskStatus};
pub use transport::{AgentReply, AgentTransport};
