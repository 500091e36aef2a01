//! JSON shapes of the API: response views and root-keyed request envelopes.
//!
//! Views flatten typed ids into plain UUIDs and never expose internal
//! storage details such as the key of an uploaded model file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use labhub_domain::alert::Alert;
use labhub_domain::data_point::{DataPoint, DataPointParams};
use labhub_domain::hub::{Hub, HubParams};
use labhub_domain::id::HubId;
use labhub_domain::job::{Job, JobData, JobParams};
use labhub_domain::printer::{Printer, PrinterParams};
use labhub_domain::sensor::{Sensor, SensorParams};
use labhub_domain::user::{ApiToken, User, UserParams};

// -- responses ---------------------------------------------------------------

#[derive(Debug, Serialize, ToSchema)]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub admin: bool,
    pub default_hub_id: Option<Uuid>,
    pub current_sign_in_at: Option<DateTime<Utc>>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id.as_uuid(),
            name: user.name,
            email: user.email,
            image: user.image,
            admin: user.admin,
            default_hub_id: user.default_hub_id.map(HubId::as_uuid),
            current_sign_in_at: user.current_sign_in_at,
            last_sign_in_at: user.last_sign_in_at,
            created_at: user.created_at,
        }
    }
}

/// A new account together with its API token. The token is not retrievable
/// afterwards.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedUserView {
    pub user: UserView,
    pub token: String,
}

impl From<(User, ApiToken)> for CreatedUserView {
    fn from((user, token): (User, ApiToken)) -> Self {
        Self {
            user: user.into(),
            token: token.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PrinterView {
    pub id: Uuid,
    pub name: String,
    pub model: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Printer> for PrinterView {
    fn from(printer: Printer) -> Self {
        Self {
            id: printer.id.as_uuid(),
            name: printer.name,
            model: printer.model,
            owner_id: printer.owner_id.as_uuid(),
            created_at: printer.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JobView {
    pub id: Uuid,
    pub printer_id: Uuid,
    pub model_file_name: Option<String>,
    /// Download location of the model file, when one was uploaded.
    pub model_url: Option<String>,
    #[schema(value_type = Object)]
    pub data: JobData,
    pub created_by_user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Job> for JobView {
    fn from(job: Job) -> Self {
        Self {
            id: job.id.as_uuid(),
            printer_id: job.printer_id.as_uuid(),
            model_url: job
                .model
                .as_ref()
                .map(|_| format!("/api/v1/jobs/{}/model", job.id)),
            model_file_name: job.model_file_name,
            data: job.data,
            created_by_user_id: job.created_by_user_id.as_uuid(),
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AlertView {
    pub id: Uuid,
    pub job_id: Uuid,
    pub printer_id: Uuid,
    pub from_status: Option<String>,
    pub to_status: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Alert> for AlertView {
    fn from(alert: Alert) -> Self {
        Self {
            id: alert.id.as_uuid(),
            job_id: alert.job_id.as_uuid(),
            printer_id: alert.printer_id.as_uuid(),
            from_status: alert.from_status,
            to_status: alert.to_status,
            created_at: alert.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HubView {
    pub id: Uuid,
    pub name: String,
    pub location: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Hub> for HubView {
    fn from(hub: Hub) -> Self {
        Self {
            id: hub.id.as_uuid(),
            name: hub.name,
            location: hub.location,
            owner_id: hub.owner_id.as_uuid(),
            created_at: hub.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SensorView {
    pub id: Uuid,
    pub hub_id: Uuid,
    pub friendly_id: String,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub desc: Option<String>,
    pub data_count: Option<i64>,
    pub low_threshold: Option<f64>,
    pub high_threshold: Option<f64>,
    pub node_id: Option<i64>,
    pub pin: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Sensor> for SensorView {
    fn from(sensor: Sensor) -> Self {
        Self {
            id: sensor.id.as_uuid(),
            hub_id: sensor.hub_id.as_uuid(),
            friendly_id: sensor.friendly_id,
            category: sensor.category,
            manufacturer: sensor.manufacturer,
            model: sensor.model,
            desc: sensor.desc,
            data_count: sensor.data_count,
            low_threshold: sensor.low_threshold,
            high_threshold: sensor.high_threshold,
            node_id: sensor.node_id,
            pin: sensor.pin,
            created_at: sensor.created_at,
            updated_at: sensor.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DataPointView {
    pub id: Uuid,
    pub sensor_id: Uuid,
    pub value: f64,
    pub recorded_at: DateTime<Utc>,
}

impl From<DataPoint> for DataPointView {
    fn from(point: DataPoint) -> Self {
        Self {
            id: point.id.as_uuid(),
            sensor_id: point.sensor_id.as_uuid(),
            value: point.value,
            recorded_at: point.recorded_at,
        }
    }
}

/// Convert every element of a list into its view.
pub fn all<T, V: From<T>>(items: Vec<T>) -> Vec<V> {
    items.into_iter().map(V::from).collect()
}

// -- requests ----------------------------------------------------------------
//
// Every body is wrapped in a root key. A missing root key yields an empty
// parameter set, and unknown attributes are dropped by deserialization.

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct JobBody {
    pub model_file_name: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub data: Option<JobData>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct JobRequest {
    pub job: JobBody,
}

impl From<JobRequest> for JobParams {
    fn from(JobRequest { job }: JobRequest) -> Self {
        Self {
            model_file_name: job.model_file_name,
            data: job.data,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SensorBody {
    pub friendly_id: Option<String>,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub desc: Option<String>,
    pub data_count: Option<i64>,
    pub low_threshold: Option<f64>,
    pub high_threshold: Option<f64>,
    pub node_id: Option<i64>,
    pub pin: Option<i64>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SensorRequest {
    pub sensor: SensorBody,
}

impl From<SensorRequest> for SensorParams {
    fn from(SensorRequest { sensor }: SensorRequest) -> Self {
        Self {
            friendly_id: sensor.friendly_id,
            category: sensor.category,
            manufacturer: sensor.manufacturer,
            model: sensor.model,
            desc: sensor.desc,
            data_count: sensor.data_count,
            low_threshold: sensor.low_threshold,
            high_threshold: sensor.high_threshold,
            node_id: sensor.node_id,
            pin: sensor.pin,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct DataPointBody {
    pub value: Option<f64>,
    pub recorded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct DataPointRequest {
    pub data_point: DataPointBody,
}

impl From<DataPointRequest> for DataPointParams {
    fn from(DataPointRequest { data_point }: DataPointRequest) -> Self {
        Self {
            value: data_point.value,
            recorded_at: data_point.recorded_at,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PrinterBody {
    pub name: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PrinterRequest {
    pub printer: PrinterBody,
}

impl From<PrinterRequest> for PrinterParams {
    fn from(PrinterRequest { printer }: PrinterRequest) -> Self {
        Self {
            name: printer.name,
            model: printer.model,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct HubBody {
    pub name: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct HubRequest {
    pub hub: HubBody,
}

impl From<HubRequest> for HubParams {
    fn from(HubRequest { hub }: HubRequest) -> Self {
        Self {
            name: hub.name,
            location: hub.location,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct UserBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    pub admin: Option<bool>,
    pub default_hub_id: Option<Uuid>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct UserRequest {
    pub user: UserBody,
}

impl From<UserRequest> for UserParams {
    fn from(UserRequest { user }: UserRequest) -> Self {
        Self {
            name: user.name,
            email: user.email,
            image: user.image,
            admin: user.admin,
            default_hub_id: user.default_hub_id.map(HubId::from_uuid),
        }
    }
}
