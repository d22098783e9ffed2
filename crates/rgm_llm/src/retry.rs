//! Typed retry for streaming generations.
//!
//! A failed attempt discards the text it produced and the whole generation
//! is requested again after a fixed delay. Only errors that
//! [`LlmError::is_retryable`] accepts are retried; anything else fails
//! immediately. When every attempt fails the caller receives the partial
//! text of the last attempt, flagged as exhausted.

use std::time::Duration;

use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{LlmError, LlmResult};
use crate::provider::{GenerationRequest, Generator};

/// How often and how patiently a generation is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Pause between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Retry without pausing.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }
}

/// Text collected from a generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamedText {
    /// Concatenated chunks of the final attempt
    pub text: String,
    /// Attempts made
    pub attempts: u32,
    /// Set when every attempt failed and `text` is partial
    pub exhausted: bool,
    /// Error of the final attempt, when exhausted
    pub last_error: Option<LlmError>,
}

async fn drain<F>(
    generator: &dyn Generator,
    request: &GenerationRequest,
    text: &mut String,
    on_chunk: &mut F,
) -> LlmResult<()>
where
    F: FnMut(&str) + Send,
{
    let mut stream = generator.stream(request).await?;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        on_chunk(&chunk);
        text.push_str(&chunk);
    }
    Ok(())
}

/// Run a streaming generation under a retry policy.
///
/// Every chunk is handed to `on_chunk` as it arrives, including chunks of
/// attempts that later fail.
pub async fn stream_with_retry<F>(
    generator: &dyn Generator,
    request: &GenerationRequest,
    policy: &RetryPolicy,
    mut on_chunk: F,
) -> LlmResult<StreamedText>
where
    F: FnMut(&str) + Send,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        let mut text = String::new();

        match drain(generator, request, &mut text, &mut on_chunk).await {
            Ok(()) => {
                if attempt > 1 {
                    debug!(attempt, "Generation succeeded after retry");
                }
                return Ok(StreamedText {
                    text,
                    attempts: attempt,
                    exhausted: false,
                    last_error: None,
                });
            }
            Err(error) if !error.is_retryable() => {
                warn!(provider = generator.name(), %error, "Generation failed with non-retryable error");
                return Err(error);
            }
            Err(error) if attempt >= max_attempts => {
                warn!(
                    provider = generator.name(),
                    attempts = attempt,
                    %error,
                    "Generation retries exhausted, continuing with partial output"
                );
                return Ok(StreamedText {
                    text,
                    attempts: attempt,
                    exhausted: true,
                    last_error: Some(error),
                });
            }
            Err(error) => {
                warn!(
                    provider = generator.name(),
                    attempt,
                    max_attempts,
                    %error,
                    "Generation failed, retrying in {:.1}s",
                    policy.delay.as_secs_f64()
                );
                sleep(policy.delay).await;
            }
        }
    }
}
