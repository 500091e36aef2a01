//! Task dispatcher port: hands side effects to a background queue.

use std::future::Future;

use labhub_domain::error::LabHubError;
use labhub_domain::task::Task;

/// Enqueues [`Task`]s for asynchronous processing.
///
/// Dispatching only means "accepted by the queue"; nobody awaits the outcome.
pub trait TaskDispatcher {
    fn dispatch(&self, task: Task) -> impl Future<Output = Result<(), LabHubError>> + Send;
}

impl<T: TaskDispatcher + Send + Sync> TaskDispatcher for std::sync::Arc<T> {
    fn dispatch(&self, task: Task) -> impl Future<Output = Result<(), LabHubError>> + Send {
        (**self).dispatch(task)
    }
}
