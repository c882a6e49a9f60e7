//! Work records and result records.

use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

use shared_types::CancelToken;

/// Identifier assigned to a task when it is submitted.
pub type TaskId = u64;

/// Boxed future produced by a task.
pub type TaskFuture<T, E> = BoxFuture<'static, Result<T, E>>;

/// A unit of work. Receives the submitter's token so RPCs inside it can
/// honour the caller's deadline.
pub type Task<T, E> = Box<dyn FnOnce(CancelToken) -> TaskFuture<T, E> + Send>;

/// Box a closure into a [`Task`].
pub fn task<T, E, F, Fut>(f: F) -> Task<T, E>
where
    F: FnOnce(CancelToken) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    Box::new(move |token| Box::pin(f(token)))
}

/// A submitted task waiting for (or running on) a worker.
pub struct WorkRecord<T, E> {
    pub id: TaskId,
    pub task: Task<T, E>,
    /// Submitter's token. If it fires before the task finishes the result
    /// is abandoned.
    pub cancel: CancelToken,
    pub submitted_at: Instant,
}

impl<T, E> fmt::Debug for WorkRecord<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkRecord")
            .field("id", &self.id)
            .field("submitted_at", &self.submitted_at)
            .finish_non_exhaustive()
    }
}

/// Outcome of one task, emitted on the pool's shared results stream.
#[derive(Debug)]
pub struct WorkResult<T, E> {
    /// Id returned by `submit` for this task
    pub task_id: TaskId,
    /// Worker that ran the task
    pub worker_name: String,
    /// Task output or task-level error
    pub value: Result<T, E>,
    /// Execution time (excludes queueing)
    pub duration: Duration,
    /// Time spent between submission and execution start
    pub queued: Duration,
}
