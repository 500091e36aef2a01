//! In-process task queue and the background worker that drains it.
//!
//! Writers hand [`Task`]s to an [`InProcessTaskQueue`]; a single
//! [`TaskWorker`] receives them and runs them through a [`TaskHandler`],
//! retrying failures with a linear backoff. Delivery is at-least-once.

use std::future::Future;
use std::time::Duration;

use labhub_domain::error::LabHubError;
use labhub_domain::task::Task;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::ports::TaskDispatcher;

/// Executes a single task. Implementations must tolerate running the
/// same task twice.
pub trait TaskHandler {
    fn handle(&self, task: &Task) -> impl Future<Output = Result<(), LabHubError>> + Send;
}

/// Sending half of the queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct InProcessTaskQueue {
    sender: mpsc::Sender<Task>,
}

impl InProcessTaskQueue {
    /// Create a bounded queue holding at most `capacity` pending tasks.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Task>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }
}

impl TaskDispatcher for InProcessTaskQueue {
    /// Enqueue without waiting. When the queue is full the task is handed to
    /// a spawned sender that waits for room, so callers never block on the
    /// worker.
    fn dispatch(&self, task: Task) -> impl Future<Output = Result<(), LabHubError>> + Send {
        let result = match self.sender.try_send(task) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(task)) => {
                tracing::warn!(task = task.name(), "task queue full, deferring task");
                let sender = self.sender.clone();
                tokio::spawn(async move {
                    let name = task.name();
                    if sender.send(task).await.is_err() {
                        tracing::error!(task = name, "task queue closed, deferred task dropped");
                    }
                });
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(LabHubError::QueueClosed),
        };
        std::future::ready(result)
    }
}

/// Retry policy of the worker.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Delay before the second attempt; grows linearly afterwards.
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Background consumer of the task queue.
pub struct TaskWorker<H> {
    handler: H,
    receiver: mpsc::Receiver<Task>,
    policy: RetryPolicy,
}

impl<H: TaskHandler + Send + Sync + 'static> TaskWorker<H> {
    /// Spawn the worker. The returned handle completes once every sender
    /// has been dropped and the remaining tasks have been processed.
    pub fn start(handler: H, receiver: mpsc::Receiver<Task>, policy: RetryPolicy) -> JoinHandle<()> {
        let worker = Self {
            handler,
            receiver,
            policy,
        };

        tokio::spawn(worker.run())
    }

    async fn run(mut self) {
        while let Some(task) = self.receiver.recv().await {
            self.process(&task).await;
        }
        tracing::info!("task queue closed, worker stopped");
    }

    async fn process(&self, task: &Task) {
        let max_attempts = self.policy.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            match self.handler.handle(task).await {
                Ok(()) => {
                    tracing::debug!(task = task.name(), attempt, "task done");
                    return;
                }
                Err(err) if attempt < max_attempts => {
                    tracing::warn!(%err, task = task.name(), attempt, "task failed, retrying");
                    tokio::time::sleep(self.policy.retry_delay * attempt).await;
                }
                Err(err) => {
                    tracing::error!(%err, task = task.name(), attempt, "task failed, giving up");
                }
            }
        }
    }
}
