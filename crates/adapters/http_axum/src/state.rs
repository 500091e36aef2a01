//! Shared application state for axum handlers.

use std::sync::Arc;

use labhub_app::ports::{
    AlertRepository, DataPointRepository, HubRepository, JobRepository, ModelFileStore,
    PrinterRepository, SensorRepository, TaskDispatcher, UserRepository,
};
use labhub_app::services::{HubService, JobService, PrinterService, SensorService, UserService};

/// The set of port implementations the API runs on.
///
/// Bundling them in one trait keeps handler signatures to a single generic
/// parameter instead of one per port.
pub trait Backend: Send + Sync + 'static {
    type Users: UserRepository + Send + Sync + 'static;
    type Printers: PrinterRepository + Send + Sync + 'static;
    type Jobs: JobRepository + Send + Sync + 'static;
    type Alerts: AlertRepository + Send + Sync + 'static;
    type Hubs: HubRepository + Send + Sync + 'static;
    type Sensors: SensorRepository + Send + Sync + 'static;
    type DataPoints: DataPointRepository + Send + Sync + 'static;
    type Dispatcher: TaskDispatcher + Send + Sync + 'static;
    type Models: ModelFileStore + Send + Sync + 'static;
}

pub type JobServiceOf<B> = JobService<
    <B as Backend>::Printers,
    <B as Backend>::Jobs,
    <B as Backend>::Alerts,
    <B as Backend>::Dispatcher,
    <B as Backend>::Models,
>;

pub type SensorServiceOf<B> = SensorService<
    <B as Backend>::Hubs,
    <B as Backend>::Sensors,
    <B as Backend>::DataPoints,
    <B as Backend>::Dispatcher,
>;

/// Application state shared across all axum handlers.
///
/// `Clone` is implemented manually so the underlying types themselves do not
/// need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<B: Backend> {
    pub user_service: Arc<UserService<B::Users>>,
    pub printer_service: Arc<PrinterService<B::Printers>>,
    pub job_service: Arc<JobServiceOf<B>>,
    pub hub_service: Arc<HubService<B::Hubs>>,
    pub sensor_service: Arc<SensorServiceOf<B>>,
}

impl<B: Backend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            user_service: Arc::clone(&self.user_service),
            printer_service: Arc::clone(&self.printer_service),
            job_service: Arc::clone(&self.job_service),
            hub_service: Arc::clone(&self.hub_service),
            sensor_service: Arc::clone(&self.sensor_service),
        }
    }
}

impl<B: Backend> AppState<B> {
    /// Create a new application state from service instances.
    pub fn new(
        user_service: UserService<B::Users>,
        printer_service: PrinterService<B::Printers>,
        job_service: JobServiceOf<B>,
        hub_service: HubService<B::Hubs>,
        sensor_service: SensorServiceOf<B>,
    ) -> Self {
        Self {
            user_service: Arc::new(user_service),
            printer_service: Arc::new(printer_service),
            job_service: Arc::new(job_service),
            hub_service: Arc::new(hub_service),
            sensor_service: Arc::new(sensor_service),
        }
    }
}
