use crate::app::AppContext;
use crate::domain::{AppError, TaskLogEntry};
use crate::ports::SeedStore;

/// The most recent `limit` task-log entries, oldest first.
pub fn execute<S: SeedStore>(
    ctx: &AppContext<S>,
    limit: usize,
) -> Result<Vec<TaskLogEntry>, AppError> {
    ctx.task_log().tail(limit)
}
