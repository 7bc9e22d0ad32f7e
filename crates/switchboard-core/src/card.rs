//! Agent Card — the descriptor each adapter publishes at `GET /`

use serde::{Deserialize, Serialize};

/// A named skill an agent advertises, with tags used for routing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSkill {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

/// Static description of an agent: identity, capabilities and where to reach it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentCard {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub skills: Vec<AgentSkill>,
    #[serde(alias = "url")]
    pub endpoint: String,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

impl AgentCard {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            version: default_version(),
            capabilities: Vec::new(),
            skills: Vec::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn with_capability(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.capabilities.contains(&tag) {
            self.capabilities.push(tag);
        }
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_skill(mut self, skill: AgentSkill) -> Self {
        self.skills.push(skill);
        self
    }

    /// Declared capabilities followed by skill tags, deduplicated, in declaration order
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = Vec::new();
        let skill_tags = self.skills.iter().flat_map(|s| s.tags.iter());
        for tag in self.capabilities.iter().chain(skill_tags) {
            if !tags.contains(&tag.as_str()) {
                tags.push(tag);
            }
        }
        tags
    }

    /// Endpoint without a trailing slash, ready for path joins
    pub fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }
}
