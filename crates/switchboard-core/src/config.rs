//! Configuration loaded from `~/.switchboard/config.toml`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::card::AgentCard;
use crate::selection::KeywordScorer;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub agents: Vec<AgentEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Upper bound on one dispatch, including polling
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Delay between `GET /tasks/{id}` polls while an adapter reports `working`
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_ms() -> u64 {
    500
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl DispatchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// A card must score strictly above this to be auto-selected
    #[serde(default)]
    pub min_score: f32,
    /// Extra keywords per capability tag, merged into the built-in table
    #[serde(default)]
    pub keywords: BTreeMap<String, Vec<String>>,
}

impl SelectionConfig {
    pub fn scorer(&self) -> KeywordScorer {
        self.keywords
            .iter()
            .fold(KeywordScorer::new(), |scorer, (tag, words)| {
                scorer.with_keywords(tag, words)
            })
    }
}

/// One adapter the orchestrator should know about.
///
/// With `name` set the card is built from this entry; without it the card is
/// fetched from the adapter's `GET /` at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEntry {
    pub endpoint: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl AgentEntry {
    pub fn static_card(&self) -> Option<AgentCard> {
        let name = self.name.as_ref()?;
        let mut card = AgentCard::new(name.clone(), self.endpoint.clone());
        if let Some(desc) = &self.description {
            card = card.with_description(desc.clone());
        }
        for cap in &self.capabilities {
            card = card.with_capability(cap.clone());
        }
        Some(card)
    }
}

impl Config {
    /// Default config location: `~/.switchboard/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".switchboard").join("config.toml"))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Load from `path`, or the default location if it exists, or fall back to defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            bail!("server.port must be non-zero");
        }
        if self.dispatch.timeout_secs == 0 {
            bail!("dispatch.timeout_secs must be non-zero");
        }
        if self.dispatch.poll_interval_ms == 0 {
            bail!("dispatch.poll_interval_ms must be non-zero");
        }
        if self.selection.min_score < 0.0 {
            bail!("selection.min_score must not be negative");
        }

        let mut seen: Vec<&str> = Vec::new();
        for entry in &self.agents {
            url::Url::parse(&entry.endpoint)
                .with_context(|| format!("Invalid agent endpoint '{}'", entry.endpoint))?;
            if let Some(name) = entry.name.as_deref() {
                if name.trim().is_empty() {
                    bail!("Agent name for {} must not be empty", entry.endpoint);
                }
                if seen.contains(&name) {
                    bail!("Agent '{}' is configured more than once", name);
                }
                seen.push(name);
            }
        }
        Ok(())
    }
}
