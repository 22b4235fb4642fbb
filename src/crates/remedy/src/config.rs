//! Service configuration.
//!
//! Loaded from `remedy.toml`. Every section is optional and falls back to
//! built-in defaults, so an empty file (or none at all) is a valid setup.

use crate::knowledge::KnowledgeBase;
use crate::pipeline::EscalationPolicy;
use browser_agent::AgentConfig;
use llm::{GenerationConfig, LocalLlmConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Listening address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Generation back end plus sampling parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationSection {
    #[serde(flatten)]
    pub service: LocalLlmConfig,
    #[serde(default)]
    pub sampling: GenerationConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSection {
    pub escalation: EscalationPolicy,
}

/// Complete service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemedyConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub generation: GenerationSection,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub pipeline: PipelineSection,
    /// Extra knowledge base entries, disease to treatment.
    #[serde(default)]
    pub knowledge: BTreeMap<String, String>,
}

impl RemedyConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration.
    ///
    /// Searches for config in:
    /// 1. `explicit` (the `--config` flag or `REMEDY_CONFIG`)
    /// 2. ./config/remedy.toml
    /// 3. ./remedy.toml
    ///
    /// Falls back to defaults when none exists. An explicit path must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let paths = [
            PathBuf::from("config/remedy.toml"),
            PathBuf::from("./remedy.toml"),
        ];

        for path in &paths {
            if path.exists() {
                return Self::from_file(path);
            }
        }

        Ok(Self::default())
    }

    /// Apply the `HOST` and `PORT` environment variables.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.override_address(std::env::var("HOST").ok(), std::env::var("PORT").ok())
    }

    fn override_address(
        &mut self,
        host: Option<String>,
        port: Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidConfig(format!("PORT must be a valid u16, got {port:?}")))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generation
            .sampling
            .validate()
            .map_err(|e| ConfigError::InvalidConfig(e.to_string()))?;
        self.agent
            .validate()
            .map_err(|e| ConfigError::InvalidConfig(e.to_string()))?;
        if let Some(disease) = self.knowledge.keys().find(|k| k.trim().is_empty()) {
            return Err(ConfigError::InvalidConfig(format!(
                "knowledge entry with blank disease name: {disease:?}"
            )));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| ConfigError::InvalidConfig(format!("invalid listen address: {e}")))
    }

    /// Seed entries plus the configured extras.
    pub fn knowledge_base(&self) -> KnowledgeBase {
        KnowledgeBase::seeded().with_entries(self.knowledge.iter())
    }
}
