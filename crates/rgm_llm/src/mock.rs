//! Mock generator for testing.
//!
//! Replays scripted replies in call order and records every request, so
//! agent tests can drive whole runs without a network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use parking_lot::RwLock;

use crate::error::{LlmError, LlmResult};
use crate::provider::{ChunkStream, GenerationRequest, Generator};
use crate::schema::{FilesResponse, GeneratedFile};

/// A scripted reply to one generation request.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Stream these chunks and finish cleanly.
    Chunks(Vec<String>),
    /// Fail before any chunk is produced.
    Fail(LlmError),
    /// Stream these chunks, then fail.
    Interrupted { chunks: Vec<String>, error: LlmError },
}

impl MockReply {
    pub fn chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockReply::Chunks(chunks.into_iter().map(Into::into).collect())
    }

    /// A single-chunk text reply.
    pub fn text(text: impl Into<String>) -> Self {
        MockReply::Chunks(vec![text.into()])
    }

    /// A structured file-batch reply, split into two chunks.
    pub fn files(files: &[(&str, &str)]) -> Self {
        let response = FilesResponse {
            files: files
                .iter()
                .map(|(path, code)| GeneratedFile {
                    path: path.to_string(),
                    sourcecode: code.to_string(),
                })
                .collect(),
        };
        let json = serde_json::to_string(&response).unwrap_or_default();
        let mut mid = json.len() / 2;
        while !json.is_char_boundary(mid) {
            mid -= 1;
        }
        MockReply::Chunks(vec![json[..mid].to_string(), json[mid..].to_string()])
    }

    pub fn fail(error: LlmError) -> Self {
        MockReply::Fail(error)
    }

    pub fn interrupted<I, S>(chunks: I, error: LlmError) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockReply::Interrupted {
            chunks: chunks.into_iter().map(Into::into).collect(),
            error,
        }
    }
}

/// Scripted generator.
///
/// Replies are consumed in order. Once the script is exhausted the fallback
/// reply is used, or a non-retryable error when none is set.
#[derive(Clone, Default)]
pub struct MockGenerator {
    replies: Arc<RwLock<Vec<MockReply>>>,
    fallback: Arc<RwLock<Option<MockReply>>>,
    index: Arc<AtomicUsize>,
    requests: Arc<RwLock<Vec<GenerationRequest>>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply.
    pub fn add_reply(self, reply: MockReply) -> Self {
        self.replies.write().push(reply);
        self
    }

    /// Reply used after the script runs out.
    pub fn with_fallback(self, reply: MockReply) -> Self {
        *self.fallback.write() = Some(reply);
        self
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.read().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.read().len()
    }

    /// Number of structured (schema-constrained) requests received.
    pub fn structured_calls(&self) -> usize {
        self.requests
            .read()
            .iter()
            .filter(|r| r.is_structured())
            .count()
    }

    fn next_reply(&self) -> MockReply {
        let index = self.index.fetch_add(1, Ordering::SeqCst);
        if let Some(reply) = self.replies.read().get(index) {
            return reply.clone();
        }
        self.fallback.read().clone().unwrap_or_else(|| {
            MockReply::Fail(LlmError::InvalidResponse(
                "mock generator script exhausted".to_string(),
            ))
        })
    }
}

#[async_trait]
impl Generator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn stream(&self, request: &GenerationRequest) -> LlmResult<ChunkStream> {
        self.requests.write().push(request.clone());

        let items: Vec<LlmResult<String>> = match self.next_reply() {
            MockReply::Chunks(chunks) => chunks.into_iter().map(Ok).collect(),
            MockReply::Fail(error) => return Err(error),
            MockReply::Interrupted { chunks, error } => chunks
                .into_iter()
                .map(Ok)
                .chain(std::iter::once(Err(error)))
                .collect(),
        };
        Ok(Box::pin(stream::iter(items)))
    }
}
