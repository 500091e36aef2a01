//! Storage port: repository traits for persistence.

use std::future::Future;

use labhub_domain::alert::Alert;
use labhub_domain::data_point::DataPoint;
use labhub_domain::error::LabHubError;
use labhub_domain::hub::Hub;
use labhub_domain::id::{HubId, JobId, PrinterId, SensorId, UserId};
use labhub_domain::job::Job;
use labhub_domain::printer::Printer;
use labhub_domain::sensor::Sensor;
use labhub_domain::time::Timestamp;
use labhub_domain::user::{TokenDigest, User};

/// Repository for [`User`]s and their token digests.
pub trait UserRepository {
    /// Create a user whose API token hashes to `digest`.
    fn create(
        &self,
        user: User,
        digest: TokenDigest,
    ) -> impl Future<Output = Result<User, LabHubError>> + Send;

    fn get_by_id(&self, id: UserId)
    -> impl Future<Output = Result<Option<User>, LabHubError>> + Send;

    /// Find the user owning the token with the given digest.
    fn find_by_token_digest(
        &self,
        digest: &TokenDigest,
    ) -> impl Future<Output = Result<Option<User>, LabHubError>> + Send;

    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, LabHubError>> + Send;

    fn update(&self, user: User) -> impl Future<Output = Result<User, LabHubError>> + Send;

    fn count(&self) -> impl Future<Output = Result<usize, LabHubError>> + Send;
}

/// Repository for [`Printer`]s.
pub trait PrinterRepository {
    fn create(&self, printer: Printer)
    -> impl Future<Output = Result<Printer, LabHubError>> + Send;

    fn get_by_id(
        &self,
        id: PrinterId,
    ) -> impl Future<Output = Result<Option<Printer>, LabHubError>> + Send;

    fn get_all(&self) -> impl Future<Output = Result<Vec<Printer>, LabHubError>> + Send;

    fn find_by_owner(
        &self,
        owner_id: UserId,
    ) -> impl Future<Output = Result<Vec<Printer>, LabHubError>> + Send;

    /// Delete a printer together with its jobs.
    fn delete(&self, id: PrinterId) -> impl Future<Output = Result<(), LabHubError>> + Send;
}

/// Repository for print [`Job`]s.
pub trait JobRepository {
    fn create(&self, job: Job) -> impl Future<Output = Result<Job, LabHubError>> + Send;

    fn get_by_id(&self, id: JobId) -> impl Future<Output = Result<Option<Job>, LabHubError>> + Send;

    /// Jobs of a printer, newest first.
    fn find_by_printer(
        &self,
        printer_id: PrinterId,
    ) -> impl Future<Output = Result<Vec<Job>, LabHubError>> + Send;

    fn update(&self, job: Job) -> impl Future<Output = Result<Job, LabHubError>> + Send;
}

/// Repository for [`Hub`]s.
pub trait HubRepository {
    fn create(&self, hub: Hub) -> impl Future<Output = Result<Hub, LabHubError>> + Send;

    fn get_by_id(&self, id: HubId) -> impl Future<Output = Result<Option<Hub>, LabHubError>> + Send;

    fn get_all(&self) -> impl Future<Output = Result<Vec<Hub>, LabHubError>> + Send;

    fn find_by_owner(
        &self,
        owner_id: UserId,
    ) -> impl Future<Output = Result<Vec<Hub>, LabHubError>> + Send;

    /// Delete a hub together with its sensors and their data.
    fn delete(&self, id: HubId) -> impl Future<Output = Result<(), LabHubError>> + Send;
}

/// Repository for [`Sensor`]s.
pub trait SensorRepository {
    fn create(&self, sensor: Sensor) -> impl Future<Output = Result<Sensor, LabHubError>> + Send;

    fn get_by_id(
        &self,
        id: SensorId,
    ) -> impl Future<Output = Result<Option<Sensor>, LabHubError>> + Send;

    fn find_by_hub(
        &self,
        hub_id: HubId,
    ) -> impl Future<Output = Result<Vec<Sensor>, LabHubError>> + Send;

    fn find_by_hub_and_friendly_id(
        &self,
        hub_id: HubId,
        friendly_id: &str,
    ) -> impl Future<Output = Result<Option<Sensor>, LabHubError>> + Send;

    fn update(&self, sensor: Sensor) -> impl Future<Output = Result<Sensor, LabHubError>> + Send;

    /// Delete a sensor together with its data points.
    ///
    /// Returns `false` when nothing was deleted.
    fn delete(&self, id: SensorId) -> impl Future<Output = Result<bool, LabHubError>> + Send;
}

/// Repository for sensor [`DataPoint`]s.
pub trait DataPointRepository {
    fn record(&self, point: DataPoint)
    -> impl Future<Output = Result<DataPoint, LabHubError>> + Send;

    /// Readings of a sensor recorded at or after `since` (all when `None`),
    /// oldest first.
    fn find_by_sensor_since(
        &self,
        sensor_id: SensorId,
        since: Option<Timestamp>,
    ) -> impl Future<Output = Result<Vec<DataPoint>, LabHubError>> + Send;
}

/// Repository for job [`Alert`]s.
pub trait AlertRepository {
    fn record(&self, alert: Alert) -> impl Future<Output = Result<Alert, LabHubError>> + Send;

    /// Alerts of a job, newest first.
    fn find_by_job(
        &self,
        job_id: JobId,
    ) -> impl Future<Output = Result<Vec<Alert>, LabHubError>> + Send;
}
