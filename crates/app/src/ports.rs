//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod model_store;
pub mod storage;
pub mod task_dispatcher;

pub use model_store::ModelFileStore;
pub use storage::{
    AlertRepository, DataPointRepository, HubRepository, JobRepository, PrinterRepository,
    SensorRepository, UserRepository,
};
pub use task_dispatcher::TaskDispatcher;
