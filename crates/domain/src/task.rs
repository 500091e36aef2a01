//! Task: a side effect dispatched after a successful write.
//!
//! Tasks are fire-and-forget: the request that produced one never waits for
//! it, and a worker may run the same task more than once.

use serde::{Deserialize, Serialize};

use crate::id::{HubId, JobId, SensorId};

/// A background side effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Task {
    /// Record a status transition of a job.
    CreateAlert {
        job_id: JobId,
        to_status: Option<String>,
        from_status: Option<String>,
    },
    /// Ask the printer to stop a job.
    CancelJob { job_id: JobId },
    /// Announce a new sensor to its hub.
    RegisterSensor { sensor_id: SensorId, hub_id: HubId },
    /// Tell a hub that one of its sensors is gone.
    DeleteSensor { hub_id: HubId, sensor_id: SensorId },
}

impl Task {
    /// Stable name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateAlert { .. } => "create_alert",
            Self::CancelJob { .. } => "cancel_job",
            Self::RegisterSensor { .. } => "register_sensor",
            Self::DeleteSensor { .. } => "delete_sensor",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_with_type_tag() {
        let job_id = JobId::new();
        let json = serde_json::to_value(Task::CancelJob { job_id }).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "cancel_job", "job_id": job_id.to_string()})
        );
    }

    #[test]
    fn should_name_every_variant() {
        let task = Task::RegisterSensor {
            sensor_id: SensorId::new(),
            hub_id: HubId::new(),
        };
        assert_eq!(task.name(), "register_sensor");
    }
}
