//! OpenAI chat completions streaming client.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::{LlmError, LlmResult};
use crate::provider::{ChunkStream, GenerationOptions, GenerationRequest, Generator, Provider};
use crate::sse::SseBuffer;

const DONE: &str = "[DONE]";

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    delta: Delta,
}

#[derive(Debug, Deserialize)]
struct Delta {
    content: Option<String>,
}

fn chunk_text(data: &str) -> LlmResult<String> {
    let chunk: StreamChunk = serde_json::from_str(data)
        .map_err(|e| LlmError::StreamInterrupted(format!("malformed chunk: {}", e)))?;
    Ok(chunk
        .choices
        .iter()
        .filter_map(|c| c.delta.content.as_deref())
        .collect())
}

/// Client for `/v1/chat/completions` with `stream: true`.
pub struct OpenAiGenerator {
    api_key: String,
    base_url: String,
    options: GenerationOptions,
    client: reqwest::Client,
}

impl OpenAiGenerator {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Provider::OpenAi.default_base_url().to_string(),
            options: GenerationOptions::default(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client from `OPENAI_API_KEY`.
    pub fn from_env() -> LlmResult<Self> {
        Ok(Self::new(Provider::OpenAi.api_key_from_env()?))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    fn build_body(&self, request: &GenerationRequest) -> Value {
        let mut body = json!({
            "model": request.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.prompt },
            ],
            "max_tokens": self.options.max_output_tokens,
            "temperature": self.options.temperature,
            "stream": true,
        });
        if let Some(schema) = &request.response_schema {
            body["response_format"] = json!({
                "type": "json_schema",
                "json_schema": {
                    "name": "file_batch",
                    "strict": true,
                    "schema": schema,
                }
            });
        }
        body
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    fn name(&self) -> &str {
        "openai"
    }

    async fn stream(&self, request: &GenerationRequest) -> LlmResult<ChunkStream> {
        info!(
            model = %request.model,
            structured = request.is_structured(),
            "Starting OpenAI generation"
        );

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&self.build_body(request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status(status, body));
        }

        let bytes = response.bytes_stream();
        let stream = async_stream::try_stream! {
            let mut sse = SseBuffer::new();
            let mut done = false;
            for await chunk in bytes {
                let chunk = chunk.map_err(|e| LlmError::StreamInterrupted(e.to_string()))?;
                for data in sse.push(&chunk) {
                    if data == DONE {
                        done = true;
                        continue;
                    }
                    let text = chunk_text(&data)?;
                    if !text.is_empty() {
                        yield text;
                    }
                }
            }
            if !done {
                Err::<(), _>(LlmError::StreamInterrupted(
                    "stream ended before [DONE]".to_string(),
                ))?;
            }
            debug!("OpenAI stream finished");
        };

        Ok(Box::pin(stream))
    }
}
