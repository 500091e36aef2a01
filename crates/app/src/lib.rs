//! # labhub-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `UserRepository`, `PrinterRepository`, `JobRepository`: accounts and print jobs
//!   - `HubRepository`, `SensorRepository`, `DataPointRepository`: sensor network
//!   - `AlertRepository`: job status history
//!   - `TaskDispatcher`: fire-and-forget side effects
//!   - `ModelFileStore`: uploaded model files
//! - Define **driving/inbound ports** as use-case services:
//!   - `UserService`: authenticate tokens, create accounts
//!   - `PrinterService`, `JobService`: printers and their jobs
//!   - `HubService`, `SensorService`: hubs, sensors, and sensor data
//! - Provide **in-process infrastructure** (task queue and worker) that doesn't need IO
//! - Authorize every use-case against the acting user before touching storage
//!
//! ## Dependency rule
//! Depends on `labhub-domain` only (plus `tokio` for channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;
pub mod task_queue;

#[cfg(test)]
pub(crate) mod testing;
