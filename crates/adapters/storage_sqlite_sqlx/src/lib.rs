//! # labhub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `labhub-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! Child records are removed through `ON DELETE CASCADE`: deleting a printer
//! drops its jobs and their alerts, deleting a hub drops its sensors and
//! their data points.
//!
//! ## Dependency rule
//! Depends on `labhub-app` (for port traits) and `labhub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod codec;
pub mod error;
pub mod pool;

pub mod alert_repo;
pub mod data_point_repo;
pub mod hub_repo;
pub mod job_repo;
pub mod printer_repo;
pub mod sensor_repo;
pub mod user_repo;

#[cfg(test)]
mod fixtures;

pub use alert_repo::SqliteAlertRepository;
pub use data_point_repo::SqliteDataPointRepository;
pub use hub_repo::SqliteHubRepository;
pub use job_repo::SqliteJobRepository;
pub use printer_repo::SqlitePrinterRepository;
pub use sensor_repo::SqliteSensorRepository;
pub use user_repo::SqliteUserRepository;
