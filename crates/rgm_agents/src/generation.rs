//! Streaming generation shared by the analyst, coder and refactorer.

use tracing::{info, warn};

use rgm_core::{AgentId, FileBatch};
use rgm_llm::{files_schema, parse_file_batch, stream_with_retry, GenerationRequest};

use crate::context::RunContext;
use crate::error::AgentResult;
use crate::events::Progress;

/// Stream a plain-text generation, forwarding chunks as progress.
pub(crate) async fn generate_text(
    ctx: &RunContext,
    agent: AgentId,
    system: &str,
    prompt: String,
    progress: &Progress,
) -> AgentResult<String> {
    let request = GenerationRequest::text(ctx.model(), system, prompt);
    let streamed = stream_with_retry(ctx.generator(), &request, ctx.retry(), |chunk| {
        progress.chunk(agent, chunk)
    })
    .await?;

    if streamed.exhausted {
        warn!(%agent, attempts = streamed.attempts, "Using partial generation output");
    }
    info!(%agent, chars = streamed.text.len(), "Generation finished");
    Ok(streamed.text)
}

/// Stream a schema-constrained generation and parse it into a file batch.
///
/// A response that is not valid JSON or does not match the file-batch
/// schema aborts the run.
pub(crate) async fn generate_files(
    ctx: &RunContext,
    agent: AgentId,
    system: &str,
    prompt: String,
    progress: &Progress,
) -> AgentResult<FileBatch> {
    let request = GenerationRequest::text(ctx.model(), system, prompt).with_schema(files_schema());
    let streamed = stream_with_retry(ctx.generator(), &request, ctx.retry(), |chunk| {
        progress.chunk(agent, chunk)
    })
    .await?;

    if streamed.exhausted {
        warn!(%agent, attempts = streamed.attempts, "Using partial generation output");
    }
    let batch = parse_file_batch(&streamed.text)?;
    info!(%agent, files = batch.len(), "Generated files");
    Ok(batch)
}
