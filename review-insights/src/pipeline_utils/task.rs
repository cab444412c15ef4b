//! Task execution utilities with automatic logging

use crate::pipeline_utils::batch::TaskContext;
use review_insights_sdk::{log_task_complete, log_task_failed, log_task_start};
use std::fmt::Display;
use std::future::Future;
use tracing::{debug, warn};

/// Execute a single task with automatic logging
///
/// Wraps task execution with:
/// - `log_task_start` before execution
/// - `log_task_complete` on success
/// - `log_task_failed` on error
///
/// The error is returned unchanged; deciding how a failure degrades is the
/// caller's business.
pub async fn execute_task<F, Fut, R, E>(
    task_id: impl Into<String>,
    description: impl Into<String>,
    ctx: TaskContext,
    executor: F,
) -> Result<R, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(R, String), E>>,
    E: Display,
{
    let task_id = task_id.into();
    let description = description.into();

    log_task_start!(ctx.phase, &task_id, &description, ctx.total_tasks);
    debug!(
        "Task started - id={}, {}/{}: {}",
        task_id, ctx.task_number, ctx.total_tasks, description
    );

    match executor().await {
        Ok((result, summary)) => {
            log_task_complete!(&task_id, summary);
            Ok(result)
        }
        Err(e) => {
            warn!("Task failed - id={}: {}", task_id, e);
            log_task_failed!(&task_id, e.to_string());
            Err(e)
        }
    }
}
