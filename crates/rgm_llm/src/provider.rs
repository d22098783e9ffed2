//! Generator trait, request type and provider selection.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LlmError, LlmResult};

/// Incremental text chunks of one generation.
pub type ChunkStream = Pin<Box<dyn Stream<Item = LlmResult<String>> + Send>>;

/// One generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model identifier
    pub model: String,
    /// System instruction
    pub system: String,
    /// User content
    pub prompt: String,
    /// JSON Schema the response must follow, for structured calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
}

impl GenerationRequest {
    /// A plain-text request.
    pub fn text(
        model: impl Into<String>,
        system: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            system: system.into(),
            prompt: prompt.into(),
            response_schema: None,
        }
    }

    /// Constrain the response to a JSON Schema.
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    pub fn is_structured(&self) -> bool {
        self.response_schema.is_some()
    }
}

/// Sampling options shared by every request a client sends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_output_tokens: 8192,
            temperature: 0.9,
        }
    }
}

/// A remote text generation endpoint that streams its output.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Provider name, for logs.
    fn name(&self) -> &str;

    /// Start a generation and return its chunk stream.
    ///
    /// Errors before the first chunk are returned directly; errors after
    /// streaming started arrive as stream items.
    async fn stream(&self, request: &GenerationRequest) -> LlmResult<ChunkStream>;
}

/// Supported generation providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gemini,
    OpenAi,
}

impl Provider {
    pub fn parse(name: &str) -> LlmResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "openai" => Ok(Provider::OpenAi),
            other => Err(LlmError::UnknownProvider(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenAi => "openai",
        }
    }

    /// Environment variable holding the API key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Gemini => "https://generativelanguage.googleapis.com",
            Provider::OpenAi => "https://api.openai.com",
        }
    }

    /// Read the API key from the environment.
    pub fn api_key_from_env(&self) -> LlmResult<String> {
        match std::env::var(self.api_key_var()) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(LlmError::NotConfigured(format!(
                "set {} to use the {} provider",
                self.api_key_var(),
                self.as_str()
            ))),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::parse(s)
    }
}
