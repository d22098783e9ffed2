//! Gemini streaming client.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::{LlmError, LlmResult};
use crate::provider::{ChunkStream, GenerationOptions, GenerationRequest, Generator, Provider};
use crate::schema::to_gemini_schema;
use crate::sse::SseBuffer;

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Extract the text carried by one SSE payload.
fn chunk_text(data: &str) -> LlmResult<String> {
    let chunk: StreamChunk = serde_json::from_str(data)
        .map_err(|e| LlmError::StreamInterrupted(format!("malformed chunk: {}", e)))?;
    Ok(chunk
        .candidates
        .iter()
        .filter_map(|c| c.content.as_ref())
        .flat_map(|c| c.parts.iter())
        .filter_map(|p| p.text.as_deref())
        .collect())
}

/// Client for the Gemini `streamGenerateContent` endpoint.
pub struct GeminiGenerator {
    api_key: String,
    base_url: String,
    options: GenerationOptions,
    client: reqwest::Client,
}

impl GeminiGenerator {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Provider::Gemini.default_base_url().to_string(),
            options: GenerationOptions::default(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client from `GEMINI_API_KEY`.
    pub fn from_env() -> LlmResult<Self> {
        Ok(Self::new(Provider::Gemini.api_key_from_env()?))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url, model
        )
    }

    fn build_body(&self, request: &GenerationRequest) -> Value {
        let mut generation_config = json!({
            "maxOutputTokens": self.options.max_output_tokens,
            "temperature": self.options.temperature,
        });
        if let Some(schema) = &request.response_schema {
            generation_config["responseMimeType"] = json!("application/json");
            generation_config["responseSchema"] = to_gemini_schema(schema);
        }

        json!({
            "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }],
            "systemInstruction": { "parts": [{ "text": request.system }] },
            "generationConfig": generation_config,
        })
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn stream(&self, request: &GenerationRequest) -> LlmResult<ChunkStream> {
        info!(
            model = %request.model,
            structured = request.is_structured(),
            "Starting Gemini generation"
        );

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", &self.api_key)
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
            for await chunk in bytes {
                let chunk = chunk.map_err(|e| LlmError::StreamInterrupted(e.to_string()))?;
                for data in sse.push(&chunk) {
                    let text = chunk_text(&data)?;
                    if !text.is_empty() {
                        yield text;
                    }
                }
            }
            if let Some(data) = sse.finish() {
                let text = chunk_text(&data)?;
                if !text.is_empty() {
                    yield text;
                }
            }
            debug!("Gemini stream finished");
        };

        Ok(Box::pin(stream))
    }
}
