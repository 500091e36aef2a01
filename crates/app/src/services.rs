//! Use-case services: the driving ports of the application.

pub mod hub_service;
pub mod job_service;
pub mod printer_service;
pub mod sensor_service;
pub mod task_handler;
pub mod user_service;

pub use hub_service::HubService;
pub use job_service::JobService;
pub use printer_service::PrinterService;
pub use sensor_service::SensorService;
pub use task_handler::TaskRunner;
pub use user_service::UserService;

use labhub_domain::task::Task;

use crate::ports::TaskDispatcher;

/// Hand `task` to the dispatcher without letting a failure reach the caller.
async fn dispatch_detached<D: TaskDispatcher>(dispatcher: &D, task: Task) {
    let name = task.name();
    if let Err(err) = dispatcher.dispatch(task).await {
        tracing::warn!(%err, task = name, "failed to dispatch task");
    }
}
