//! TOML configuration for a run.
//!
//! Every field has a default, so an empty or missing `rgm.toml` yields a
//! working configuration for a Python project tested with `uv run pytest`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::repository::{Repository, DEFAULT_FAILURE_MARKERS};
use crate::writeback::OutOfBoundsPolicy;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "rgm.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RgmConfig {
    /// Model identifier passed to the generation endpoint
    pub model: String,
    pub repository: RepositorySettings,
    pub agents: AgentSettings,
    pub generation: GenerationSettings,
    pub prompts: PromptOverrides,
}

impl Default for RgmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash-exp".to_string(),
            repository: RepositorySettings::default(),
            agents: AgentSettings::default(),
            generation: GenerationSettings::default(),
            prompts: PromptOverrides::default(),
        }
    }
}

/// `[repository]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RepositorySettings {
    pub root: PathBuf,
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
    pub test_command: String,
    pub failure_markers: Vec<String>,
    /// Seconds before a test run is killed (0 = no limit)
    pub test_timeout_secs: u64,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            includes: vec![".py".to_string()],
            excludes: vec![".venv".to_string(), ".python-version".to_string()],
            test_command: "uv run pytest".to_string(),
            failure_markers: DEFAULT_FAILURE_MARKERS.iter().map(|m| m.to_string()).collect(),
            test_timeout_secs: 0,
        }
    }
}

/// `[agents]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AgentSettings {
    /// Attempts allowed for each generating agent within one run
    pub max_attempts: u32,
    pub out_of_bounds: OutOfBoundsPolicy,
    /// Hops the driver may take before aborting
    pub max_steps: u32,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            out_of_bounds: OutOfBoundsPolicy::Restart,
            max_steps: 100,
        }
    }
}

/// `[generation]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationSettings {
    /// Provider name (`gemini` or `openai`)
    pub provider: String,
    /// Requests per generation before giving up
    pub max_attempts: u32,
    /// Fixed pause between failed requests
    pub retry_delay_secs: u64,
    pub max_output_tokens: u32,
    pub temperature: f32,
    /// Override for the provider's API base URL
    pub base_url: Option<String>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            max_attempts: 3,
            retry_delay_secs: 60,
            max_output_tokens: 8192,
            temperature: 0.9,
            base_url: None,
        }
    }
}

/// `[prompts]` section: optional system prompt replacements.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PromptOverrides {
    pub analyst: Option<String>,
    pub coder: Option<String>,
    pub refactor: Option<String>,
}

impl RgmConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::read(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> CoreResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> CoreResult<String> {
        toml::to_string_pretty(self).map_err(|e| CoreError::Serialization(e.to_string()))
    }

    /// Check the invariants a run depends on.
    pub fn validate(&self) -> CoreResult<()> {
        let invalid = |msg: &str| Err(CoreError::InvalidConfig(msg.to_string()));

        if self.model.trim().is_empty() {
            return invalid("model must not be empty");
        }
        if self.repository.test_command.trim().is_empty() {
            return invalid("repository.test_command must not be empty");
        }
        if self.repository.includes.iter().all(|i| i.is_empty()) {
            return invalid("repository.includes must name at least one pattern");
        }
        if self.repository.failure_markers.iter().all(|m| m.is_empty()) {
            return invalid("repository.failure_markers must name at least one marker");
        }
        if self.agents.max_attempts == 0 {
            return invalid("agents.max_attempts must be at least 1");
        }
        if self.agents.max_steps == 0 {
            return invalid("agents.max_steps must be at least 1");
        }
        if self.generation.max_attempts == 0 {
            return invalid("generation.max_attempts must be at least 1");
        }
        Ok(())
    }

    /// Build the repository description from the `[repository]` section.
    pub fn repository(&self) -> Repository {
        let settings = &self.repository;
        Repository::new(&settings.root, &settings.test_command)
            .with_includes(settings.includes.iter().cloned())
            .with_excludes(settings.excludes.iter().cloned())
            .with_failure_markers(settings.failure_markers.iter().cloned())
            .with_test_timeout(settings.test_timeout_secs)
    }
}
