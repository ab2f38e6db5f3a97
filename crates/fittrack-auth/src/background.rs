//! Best-effort side effects that must not delay the caller.
//!
//! Tasks are never retried; a failure is logged and dropped.

use std::fmt::Display;
use std::future::Future;

use tokio_util::task::TaskTracker;

#[derive(Clone, Default)]
pub struct BackgroundTasks {
    tracker: TaskTracker,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a tracked task. Errors are logged under `task`.
    pub fn spawn<F, E>(&self, task: &'static str, fut: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        self.tracker.spawn(async move {
            if let Err(e) = fut.await {
                tracing::warn!(task, error = %e, "Background task failed");
            }
        });
    }

    /// Number of tasks still running.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Wait until every task spawned so far has finished.
    pub async fn flush(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}
