//! Map phase: one bullet summary per chunk
//!
//! A map task never fails past its own boundary. Any error becomes an empty
//! summary and is reported through the task events; siblings keep running.

use crate::analysis::prompts::map_request;
use crate::analysis::types::{MapResult, TextChunk};
use crate::llm::CompletionClient;
use crate::pipeline_utils::{execute_task, TaskContext};

/// Summarize one chunk; no retries
pub async fn summarize_chunk(
    client: &dyn CompletionClient,
    product: &str,
    chunk: TextChunk,
    temperature: f32,
    ctx: TaskContext,
) -> MapResult {
    let label = chunk.label();
    let request = map_request(product, chunk.sentiment, &chunk.text, temperature);

    let summary = execute_task(chunk.task_id(), &label, ctx, || async move {
        let text = client.complete(request).await?;
        let chars = text.chars().count();
        Ok::<_, crate::llm::LlmError>((text, format!("{} chars of summary", chars)))
    })
    .await
    .map(|text| text.trim().to_string())
    .unwrap_or_default();

    MapResult {
        sentiment: chunk.sentiment,
        label,
        summary,
    }
}
