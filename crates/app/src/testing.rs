//! In-memory port implementations shared by the service tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use labhub_domain::alert::Alert;
use labhub_domain::data_point::DataPoint;
use labhub_domain::error::LabHubError;
use labhub_domain::hub::Hub;
use labhub_domain::id::{HubId, JobId, PrinterId, SensorId, UserId};
use labhub_domain::job::Job;
use labhub_domain::printer::Printer;
use labhub_domain::sensor::Sensor;
use labhub_domain::task::Task;
use labhub_domain::time::Timestamp;
use labhub_domain::user::{TokenDigest, User};

use crate::ports::{
    AlertRepository, DataPointRepository, HubRepository, JobRepository, ModelFileStore,
    PrinterRepository, SensorRepository, TaskDispatcher, UserRepository,
};

#[derive(Clone, Default)]
pub struct InMemoryUserRepo {
    pub store: Arc<Mutex<HashMap<UserId, (User, TokenDigest)>>>,
}

impl UserRepository for InMemoryUserRepo {
    fn create(
        &self,
        user: User,
        digest: TokenDigest,
    ) -> impl Future<Output = Result<User, LabHubError>> + Send {
        self.store
            .lock()
            .unwrap()
            .insert(user.id, (user.clone(), digest));
        async { Ok(user) }
    }

    fn get_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, LabHubError>> + Send {
        let result = self.store.lock().unwrap().get(&id).map(|(u, _)| u.clone());
        async { Ok(result) }
    }

    fn find_by_token_digest(
        &self,
        digest: &TokenDigest,
    ) -> impl Future<Output = Result<Option<User>, LabHubError>> + Send {
        let result = self
            .store
            .lock()
            .unwrap()
            .values()
            .find(|(_, d)| d == digest)
            .map(|(u, _)| u.clone());
        async { Ok(result) }
    }

    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, LabHubError>> + Send {
        let result = self
            .store
            .lock()
            .unwrap()
            .values()
            .find(|(u, _)| u.email == email)
            .map(|(u, _)| u.clone());
        async { Ok(result) }
    }

    fn update(&self, user: User) -> impl Future<Output = Result<User, LabHubError>> + Send {
        if let Some(entry) = self.store.lock().unwrap().get_mut(&user.id) {
            entry.0 = user.clone();
        }
        async { Ok(user) }
    }

    fn count(&self) -> impl Future<Output = Result<usize, LabHubError>> + Send {
        let count = self.store.lock().unwrap().len();
        async move { Ok(count) }
    }
}

#[derive(Clone, Default)]
pub struct InMemoryPrinterRepo {
    pub store: Arc<Mutex<HashMap<PrinterId, Printer>>>,
}

impl PrinterRepository for InMemoryPrinterRepo {
    fn create(
        &self,
        printer: Printer,
    ) -> impl Future<Output = Result<Printer, LabHubError>> + Send {
        self.store.lock().unwrap().insert(printer.id, printer.clone());
        async { Ok(printer) }
    }

    fn get_by_id(
        &self,
        id: PrinterId,
    ) -> impl Future<Output = Result<Option<Printer>, LabHubError>> + Send {
        let result = self.store.lock().unwrap().get(&id).cloned();
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Printer>, LabHubError>> + Send {
        let result: Vec<Printer> = self.store.lock().unwrap().values().cloned().collect();
        async { Ok(result) }
    }

    fn find_by_owner(
        &self,
        owner_id: UserId,
    ) -> impl Future<Output = Result<Vec<Printer>, LabHubError>> + Send {
        let result: Vec<Printer> = self
            .store
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        async { Ok(result) }
    }

    fn delete(&self, id: PrinterId) -> impl Future<Output = Result<(), LabHubError>> + Send {
        self.store.lock().unwrap().remove(&id);
        async { Ok(()) }
    }
}

#[derive(Clone, Default)]
pub struct InMemoryJobRepo {
    pub store: Arc<Mutex<HashMap<JobId, Job>>>,
}

impl JobRepository for InMemoryJobRepo {
    fn create(&self, job: Job) -> impl Future<Output = Result<Job, LabHubError>> + Send {
        self.store.lock().unwrap().insert(job.id, job.clone());
        async { Ok(job) }
    }

    fn get_by_id(
        &self,
        id: JobId,
    ) -> impl Future<Output = Result<Option<Job>, LabHubError>> + Send {
        let result = self.store.lock().unwrap().get(&id).cloned();
        async { Ok(result) }
    }

    fn find_by_printer(
        &self,
        printer_id: PrinterId,
    ) -> impl Future<Output = Result<Vec<Job>, LabHubError>> + Send {
        let mut result: Vec<Job> = self
            .store
            .lock()
            .unwrap()
            .values()
            .filter(|j| j.printer_id == printer_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        async { Ok(result) }
    }

    fn update(&self, job: Job) -> impl Future<Output = Result<Job, LabHubError>> + Send {
        self.store.lock().unwrap().insert(job.id, job.clone());
        async { Ok(job) }
    }
}

#[derive(Clone, Default)]
pub struct InMemoryHubRepo {
    pub store: Arc<Mutex<HashMap<HubId, Hub>>>,
}

impl HubRepository for InMemoryHubRepo {
    fn create(&self, hub: Hub) -> impl Future<Output = Result<Hub, LabHubError>> + Send {
        self.store.lock().unwrap().insert(hub.id, hub.clone());
        async { Ok(hub) }
    }

    fn get_by_id(
        &self,
        id: HubId,
    ) -> impl Future<Output = Result<Option<Hub>, LabHubError>> + Send {
        let result = self.store.lock().unwrap().get(&id).cloned();
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Hub>, LabHubError>> + Send {
        let result: Vec<Hub> = self.store.lock().unwrap().values().cloned().collect();
        async { Ok(result) }
    }

    fn find_by_owner(
        &self,
        owner_id: UserId,
    ) -> impl Future<Output = Result<Vec<Hub>, LabHubError>> + Send {
        let result: Vec<Hub> = self
            .store
            .lock()
            .unwrap()
            .values()
            .filter(|h| h.owner_id == owner_id)
            .cloned()
            .collect();
        async { Ok(result) }
    }

    fn delete(&self, id: HubId) -> impl Future<Output = Result<(), LabHubError>> + Send {
        self.store.lock().unwrap().remove(&id);
        async { Ok(()) }
    }
}

#[derive(Clone, Default)]
pub struct InMemorySensorRepo {
    pub store: Arc<Mutex<HashMap<SensorId, Sensor>>>,
}

impl SensorRepository for InMemorySensorRepo {
    fn create(&self, sensor: Sensor) -> impl Future<Output = Result<Sensor, LabHubError>> + Send {
        self.store.lock().unwrap().insert(sensor.id, sensor.clone());
        async { Ok(sensor) }
    }

    fn get_by_id(
        &self,
        id: SensorId,
    ) -> impl Future<Output = Result<Option<Sensor>, LabHubError>> + Send {
        let result = self.store.lock().unwrap().get(&id).cloned();
        async { Ok(result) }
    }

    fn find_by_hub(
        &self,
        hub_id: HubId,
    ) -> impl Future<Output = Result<Vec<Sensor>, LabHubError>> + Send {
        let result: Vec<Sensor> = self
            .store
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.hub_id == hub_id)
            .cloned()
            .collect();
        async { Ok(result) }
    }

    fn find_by_hub_and_friendly_id(
        &self,
        hub_id: HubId,
        friendly_id: &str,
    ) -> impl Future<Output = Result<Option<Sensor>, LabHubError>> + Send {
        let result = self
            .store
            .lock()
            .unwrap()
            .values()
            .find(|s| s.hub_id == hub_id && s.friendly_id == friendly_id)
            .cloned();
        async { Ok(result) }
    }

    fn update(&self, sensor: Sensor) -> impl Future<Output = Result<Sensor, LabHubError>> + Send {
        self.store.lock().unwrap().insert(sensor.id, sensor.clone());
        async { Ok(sensor) }
    }

    fn delete(&self, id: SensorId) -> impl Future<Output = Result<bool, LabHubError>> + Send {
        let removed = self.store.lock().unwrap().remove(&id).is_some();
        async move { Ok(removed) }
    }
}

#[derive(Clone, Default)]
pub struct InMemoryDataPointRepo {
    pub store: Arc<Mutex<Vec<DataPoint>>>,
}

impl DataPointRepository for InMemoryDataPointRepo {
    fn record(
        &self,
        point: DataPoint,
    ) -> impl Future<Output = Result<DataPoint, LabHubError>> + Send {
        self.store.lock().unwrap().push(point.clone());
        async { Ok(point) }
    }

    fn find_by_sensor_since(
        &self,
        sensor_id: SensorId,
        since: Option<Timestamp>,
    ) -> impl Future<Output = Result<Vec<DataPoint>, LabHubError>> + Send {
        let mut result: Vec<DataPoint> = self
            .store
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.sensor_id == sensor_id && since.is_none_or(|s| p.recorded_at >= s))
            .cloned()
            .collect();
        result.sort_by_key(|p| p.recorded_at);
        async { Ok(result) }
    }
}

#[derive(Clone, Default)]
pub struct InMemoryAlertRepo {
    pub store: Arc<Mutex<Vec<Alert>>>,
}

impl AlertRepository for InMemoryAlertRepo {
    fn record(&self, alert: Alert) -> impl Future<Output = Result<Alert, LabHubError>> + Send {
        self.store.lock().unwrap().push(alert.clone());
        async { Ok(alert) }
    }

    fn find_by_job(
        &self,
        job_id: JobId,
    ) -> impl Future<Output = Result<Vec<Alert>, LabHubError>> + Send {
        let mut result: Vec<Alert> = self
            .store
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.job_id == job_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        async { Ok(result) }
    }
}

/// Dispatcher that only remembers what it was given.
#[derive(Clone, Default)]
pub struct RecordingDispatcher {
    pub tasks: Arc<Mutex<Vec<Task>>>,
}

impl RecordingDispatcher {
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.lock().unwrap().clone()
    }
}

impl TaskDispatcher for RecordingDispatcher {
    fn dispatch(&self, task: Task) -> impl Future<Output = Result<(), LabHubError>> + Send {
        self.tasks.lock().unwrap().push(task);
        async { Ok(()) }
    }
}

/// Dispatcher whose queue is always closed.
#[derive(Clone, Default)]
pub struct ClosedDispatcher;

impl TaskDispatcher for ClosedDispatcher {
    fn dispatch(&self, _task: Task) -> impl Future<Output = Result<(), LabHubError>> + Send {
        async { Err(LabHubError::QueueClosed) }
    }
}

#[derive(Clone, Default)]
pub struct InMemoryModelStore {
    pub files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl ModelFileStore for InMemoryModelStore {
    fn store(
        &self,
        job_id: JobId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<String, LabHubError>> + Send {
        let key = format!("job/model/{job_id}/{file_name}");
        self.files.lock().unwrap().insert(key.clone(), bytes);
        async { Ok(key) }
    }

    fn load(&self, key: &str) -> impl Future<Output = Result<Vec<u8>, LabHubError>> + Send {
        let result = self.files.lock().unwrap().get(key).cloned().ok_or_else(|| {
            labhub_domain::error::NotFoundError {
                entity: "Model",
                id: key.to_string(),
            }
            .into()
        });
        async { result }
    }

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), LabHubError>> + Send {
        self.files.lock().unwrap().remove(key);
        async { Ok(()) }
    }
}

pub fn admin() -> User {
    User::builder()
        .name("Admin")
        .email("admin@example.com")
        .admin(true)
        .build()
        .unwrap()
}

pub fn member(name: &str) -> User {
    User::builder()
        .name(name)
        .email(format!("{}@example.com", name.to_lowercase()))
        .build()
        .unwrap()
}
