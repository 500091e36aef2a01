//! Sensor: a probe attached to a [`Hub`](crate::hub::Hub).

use serde::{Deserialize, Serialize};

use crate::error::{LabHubError, ValidationError, messages};
use crate::id::{HubId, SensorId};
use crate::job::non_negative;
use crate::time::Timestamp;

/// A sensor wired to a hub node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub id: SensorId,
    pub hub_id: HubId,
    /// Human-facing identifier, unique within the hub.
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
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Whitelisted attributes accepted on create and update.
///
/// On update only the supplied attributes change.
#[derive(Debug, Clone, Default)]
pub struct SensorParams {
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

impl Sensor {
    /// Create a builder for constructing a [`Sensor`].
    #[must_use]
    pub fn builder() -> SensorBuilder {
        SensorBuilder::default()
    }

    /// Overwrite the supplied attributes.
    pub fn apply(&mut self, params: SensorParams, at: Timestamp) {
        if let Some(v) = params.friendly_id {
            self.friendly_id = v;
        }
        if let Some(v) = params.category {
            self.category = Some(v);
        }
        if let Some(v) = params.manufacturer {
            self.manufacturer = Some(v);
        }
        if let Some(v) = params.model {
            self.model = Some(v);
        }
        if let Some(v) = params.desc {
            self.desc = Some(v);
        }
        if let Some(v) = params.data_count {
            self.data_count = Some(v);
        }
        if let Some(v) = params.low_threshold {
            self.low_threshold = Some(v);
        }
        if let Some(v) = params.high_threshold {
            self.high_threshold = Some(v);
        }
        if let Some(v) = params.node_id {
            self.node_id = Some(v);
        }
        if let Some(v) = params.pin {
            self.pin = Some(v);
        }
        self.updated_at = at;
    }

    /// Whether `value` lies outside the configured thresholds.
    #[must_use]
    pub fn is_out_of_range(&self, value: f64) -> bool {
        self.low_threshold.is_some_and(|low| value < low)
            || self.high_threshold.is_some_and(|high| value > high)
    }

    /// Check domain invariants that do not need storage.
    ///
    /// Uniqueness of `friendly_id` within the hub is checked by the service.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] with one entry per invalid field.
    pub fn validate(&self) -> Result<(), LabHubError> {
        let mut errors = ValidationError::new();
        if self.friendly_id.trim().is_empty() {
            errors.add("friendly_id", messages::BLANK);
        }
        non_negative(&mut errors, "data_count", self.data_count);
        non_negative(&mut errors, "node_id", self.node_id);
        non_negative(&mut errors, "pin", self.pin);
        if let (Some(low), Some(high)) = (self.low_threshold, self.high_threshold)
            && low > high
        {
            errors.add("low_threshold", "must be less than or equal to high_threshold");
        }
        errors.into_result()
    }
}

/// Step-by-step builder for [`Sensor`].
#[derive(Debug, Default)]
pub struct SensorBuilder {
    id: Option<SensorId>,
    hub_id: Option<HubId>,
    params: SensorParams,
    created_at: Option<Timestamp>,
}

impl SensorBuilder {
    #[must_use]
    pub fn id(mut self, id: SensorId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn hub_id(mut self, hub_id: HubId) -> Self {
        self.hub_id = Some(hub_id);
        self
    }

    #[must_use]
    pub fn friendly_id(mut self, friendly_id: impl Into<String>) -> Self {
        self.params.friendly_id = Some(friendly_id.into());
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.params.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn thresholds(mut self, low: f64, high: f64) -> Self {
        self.params.low_threshold = Some(low);
        self.params.high_threshold = Some(high);
        self
    }

    #[must_use]
    pub fn pin(mut self, pin: i64) -> Self {
        self.params.pin = Some(pin);
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = Some(created_at);
        self
    }

    #[must_use]
    pub fn params(mut self, params: SensorParams) -> Self {
        self.params = params;
        self
    }

    /// Consume the builder, validate, and return a [`Sensor`].
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] if invariants fail.
    pub fn build(self) -> Result<Sensor, LabHubError> {
        let created_at = self.created_at.unwrap_or_else(crate::time::now);
        let p = self.params;
        let sensor = Sensor {
            id: self.id.unwrap_or_default(),
            hub_id: self.hub_id.unwrap_or_default(),
            friendly_id: p.friendly_id.unwrap_or_default(),
            category: p.category,
            manufacturer: p.manufacturer,
            model: p.model,
            desc: p.desc,
            data_count: p.data_count,
            low_threshold: p.low_threshold,
            high_threshold: p.high_threshold,
            node_id: p.node_id,
            pin: p.pin,
            created_at,
            updated_at: created_at,
        };
        sensor.validate()?;
        Ok(sensor)
    }
}
