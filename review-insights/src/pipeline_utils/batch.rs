//! Bounded-concurrency execution of independent tasks

use anyhow::{anyhow, Result};
use futures::{stream::FuturesUnordered, Future, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Context provided to each task in a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskContext {
    /// Phase number (for logging)
    pub phase: usize,
    /// Task number (1-indexed for display)
    pub task_number: usize,
    /// Total number of tasks in this batch
    pub total_tasks: usize,
}

/// Execute items concurrently with at most `batch_size` in flight
///
/// Every item runs to completion; a task reports failure through its own
/// output type rather than aborting its siblings. `on_complete` is invoked on
/// the calling task once per finished item, in completion order, which makes
/// it the single owner of any per-completion bookkeeping.
///
/// # Returns
/// Vector of results in order of completion (not input order)
///
/// # Example
/// ```rust,ignore
/// let summaries = execute_batch(
///     PHASE_MAP,
///     chunks,
///     6,
///     |chunk, ctx| async move { summarize(chunk, ctx).await },
///     |summary, ctx| tracker.record(ctx.task_number),
/// ).await?;
/// ```
pub async fn execute_batch<T, F, Fut, R, C>(
    phase: usize,
    items: Vec<T>,
    batch_size: usize,
    task_executor: F,
    mut on_complete: C,
) -> Result<Vec<R>>
where
    F: Fn(T, TaskContext) -> Fut,
    Fut: Future<Output = R>,
    C: FnMut(&R, TaskContext),
{
    if batch_size == 0 {
        return Err(anyhow!("batch_size must be greater than 0"));
    }

    let total = items.len();
    let sem = Arc::new(Semaphore::new(batch_size));
    let mut tasks = FuturesUnordered::new();

    // Push all tasks to FuturesUnordered with semaphore control
    for (idx, item) in items.into_iter().enumerate() {
        let sem = sem.clone();
        let ctx = TaskContext {
            phase,
            task_number: idx + 1,
            total_tasks: total,
        };
        let fut = task_executor(item, ctx);

        tasks.push(async move {
            // Acquire permit (waits while batch_size tasks are running)
            let _permit = sem
                .acquire()
                .await
                .map_err(|_| anyhow!("Semaphore closed"))?;

            Ok::<_, anyhow::Error>((fut.await, ctx))
        });
    }

    let mut results = Vec::with_capacity(total);
    while let Some(done) = tasks.next().await {
        let (result, ctx) = done?;
        on_complete(&result, ctx);
        results.push(result);
    }

    Ok(results)
}
