//! # rgm_llm
//!
//! Streaming generation clients for the Red Green Machine.
//!
//! A [`Generator`] turns a [`GenerationRequest`] into a stream of text
//! chunks. Plain-text requests feed the analyst; schema-constrained requests
//! return a batch of files for the coder and refactorer.
//!
//! # Features
//!
//! - **Providers**: Gemini and OpenAI over server-sent events
//! - **Typed Retry**: [`RetryPolicy`] with explicit retryable error kinds
//! - **Schema Validation**: file-batch responses are checked with JSON Schema
//! - **Mock Generator**: scripted replies and recorded requests for tests
//!
//! # Example
//!
//! ```rust,no_run
//! use rgm_llm::{stream_with_retry, GeminiGenerator, GenerationRequest, RetryPolicy};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GeminiGenerator::from_env()?;
//!     let request = GenerationRequest::text("gemini-2.0-flash-exp", "You are terse.", "Say hi");
//!     let out = stream_with_retry(&client, &request, &RetryPolicy::default(), |chunk| {
//!         print!("{}", chunk);
//!     })
//!     .await?;
//!     println!("\n{} attempt(s)", out.attempts);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod factory;
pub mod gemini;
pub mod mock;
pub mod openai;
pub mod provider;
pub mod retry;
pub mod schema;
pub mod sse;

pub use error::{LlmError, LlmResult};
pub use factory::create_generator;
pub use gemini::GeminiGenerator;
pub use mock::{MockGenerator, MockReply};
pub use openai::OpenAiGenerator;
pub use provider::{ChunkStream, GenerationOptions, GenerationRequest, Generator, Provider};
pub use retry::{stream_with_retry, RetryPolicy, StreamedText};
pub use schema::{
    files_schema, parse_file_batch, parse_files_response, to_gemini_schema, FilesResponse,
    GeneratedFile,
};
pub use sse::SseBuffer;
