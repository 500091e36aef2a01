//! Sensor service: sensors of a hub and the readings they report.

use labhub_domain::ability::{self, Action, Resource};
use labhub_domain::data_point::{DataPoint, DataPointParams, DataWindow};
use labhub_domain::error::{LabHubError, NotFoundError, ValidationError, messages};
use labhub_domain::hub::Hub;
use labhub_domain::id::{HubId, SensorId};
use labhub_domain::sensor::{Sensor, SensorParams};
use labhub_domain::task::Task;
use labhub_domain::time::now;
use labhub_domain::user::User;

use super::dispatch_detached;
use crate::ports::{DataPointRepository, HubRepository, SensorRepository, TaskDispatcher};

/// Application service for sensors and their data log.
pub struct SensorService<H, S, DP, D> {
    hubs: H,
    sensors: S,
    data: DP,
    dispatcher: D,
}

impl<H, S, DP, D> SensorService<H, S, DP, D>
where
    H: HubRepository,
    S: SensorRepository,
    DP: DataPointRepository,
    D: TaskDispatcher,
{
    pub fn new(hubs: H, sensors: S, data: DP, dispatcher: D) -> Self {
        Self {
            hubs,
            sensors,
            data,
            dispatcher,
        }
    }

    /// # Errors
    ///
    /// Returns [`LabHubError::NotFound`] for an unknown hub,
    /// [`LabHubError::Forbidden`], or a storage error.
    pub async fn list_sensors(
        &self,
        actor: &User,
        hub_id: HubId,
    ) -> Result<Vec<Sensor>, LabHubError> {
        let hub = self.load_hub(hub_id).await?;
        ability::authorize(actor, Action::Read, Resource::Sensor { hub: &hub })?;
        self.sensors.find_by_hub(hub.id).await
    }

    /// # Errors
    ///
    /// Returns [`LabHubError::NotFound`], [`LabHubError::Forbidden`], or a
    /// storage error.
    pub async fn get_sensor(&self, actor: &User, id: SensorId) -> Result<Sensor, LabHubError> {
        self.load_authorized(actor, Action::Read, id).await
    }

    /// Create a sensor under a hub and register it with the hub.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] (nothing is persisted or
    /// dispatched), [`LabHubError::NotFound`], [`LabHubError::Forbidden`],
    /// or a storage error.
    #[tracing::instrument(skip(self, actor, params), fields(actor = %actor.id))]
    pub async fn create_sensor(
        &self,
        actor: &User,
        hub_id: HubId,
        params: SensorParams,
    ) -> Result<Sensor, LabHubError> {
        let hub = self.load_hub(hub_id).await?;
        ability::authorize(actor, Action::Create, Resource::Sensor { hub: &hub })?;

        let sensor = Sensor::builder().params(params).hub_id(hub.id).build()?;
        self.ensure_friendly_id_free(&sensor).await?;
        let sensor = self.sensors.create(sensor).await?;

        dispatch_detached(
            &self.dispatcher,
            Task::RegisterSensor {
                sensor_id: sensor.id,
                hub_id: sensor.hub_id,
            },
        )
        .await;
        Ok(sensor)
    }

    /// Partially update a sensor.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`], [`LabHubError::NotFound`],
    /// [`LabHubError::Forbidden`], or a storage error.
    #[tracing::instrument(skip(self, actor, params), fields(actor = %actor.id))]
    pub async fn update_sensor(
        &self,
        actor: &User,
        id: SensorId,
        params: SensorParams,
    ) -> Result<Sensor, LabHubError> {
        let mut sensor = self.load_authorized(actor, Action::Update, id).await?;
        let previous_friendly_id = sensor.friendly_id.clone();

        sensor.apply(params, now());
        sensor.validate()?;
        if sensor.friendly_id != previous_friendly_id {
            self.ensure_friendly_id_free(&sensor).await?;
        }
        self.sensors.update(sensor).await
    }

    /// Delete a sensor and its readings, then tell the hub.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::NotFound`], [`LabHubError::Forbidden`], or a
    /// storage error.
    #[tracing::instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn delete_sensor(&self, actor: &User, id: SensorId) -> Result<(), LabHubError> {
        let sensor = self.load_authorized(actor, Action::Destroy, id).await?;
        if !self.sensors.delete(sensor.id).await? {
            return Err(not_found(id));
        }

        dispatch_detached(
            &self.dispatcher,
            Task::DeleteSensor {
                hub_id: sensor.hub_id,
                sensor_id: sensor.id,
            },
        )
        .await;
        Ok(())
    }

    /// Readings inside `window`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::NotFound`], [`LabHubError::Forbidden`], or a
    /// storage error.
    pub async fn list_data(
        &self,
        actor: &User,
        id: SensorId,
        window: DataWindow,
    ) -> Result<Vec<DataPoint>, LabHubError> {
        let sensor = self.load_authorized(actor, Action::Read, id).await?;
        self.data
            .find_by_sensor_since(sensor.id, window.since(now()))
            .await
    }

    /// Record a reading.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] for a missing or non-finite value,
    /// [`LabHubError::NotFound`], [`LabHubError::Forbidden`], or a storage
    /// error.
    #[tracing::instrument(skip(self, actor, params), fields(actor = %actor.id))]
    pub async fn add_data(
        &self,
        actor: &User,
        id: SensorId,
        params: DataPointParams,
    ) -> Result<DataPoint, LabHubError> {
        let sensor = self.load_authorized(actor, Action::Create, id).await?;
        let point = DataPoint::from_params(sensor.id, params, now())?;
        if sensor.is_out_of_range(point.value) {
            tracing::warn!(
                sensor = %sensor.id,
                friendly_id = %sensor.friendly_id,
                value = point.value,
                "reading outside of sensor thresholds"
            );
        }
        self.data.record(point).await
    }

    async fn ensure_friendly_id_free(&self, sensor: &Sensor) -> Result<(), LabHubError> {
        let existing = self
            .sensors
            .find_by_hub_and_friendly_id(sensor.hub_id, &sensor.friendly_id)
            .await?;
        match existing {
            Some(other) if other.id != sensor.id => {
                Err(ValidationError::single("friendly_id", messages::TAKEN).into())
            }
            _ => Ok(()),
        }
    }

    async fn load_hub(&self, id: HubId) -> Result<Hub, LabHubError> {
        self.hubs.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Hub",
                id: id.to_string(),
            }
            .into()
        })
    }

    async fn load_authorized(
        &self,
        actor: &User,
        action: Action,
        id: SensorId,
    ) -> Result<Sensor, LabHubError> {
        let sensor = self
            .sensors
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))?;
        let hub = self.load_hub(sensor.hub_id).await?;
        ability::authorize(actor, action, Resource::Sensor { hub: &hub })?;
        Ok(sensor)
    }
}

fn not_found(id: SensorId) -> LabHubError {
    NotFoundError {
        entity: "Sensor",
        id: id.to_string(),
    }
    .into()
}
