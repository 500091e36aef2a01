//! Data point: a timestamped sensor reading.

use chrono::{Datelike, Duration};
use serde::{Deserialize, Serialize};

use crate::error::{LabHubError, ValidationError, messages};
use crate::id::{DataPointId, SensorId};
use crate::time::Timestamp;

/// A single reading logged by a sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub id: DataPointId,
    pub sensor_id: SensorId,
    pub value: f64,
    pub recorded_at: Timestamp,
}

/// Whitelisted attributes accepted when logging a reading.
#[derive(Debug, Clone, Default)]
pub struct DataPointParams {
    pub value: Option<f64>,
    /// Defaults to the time the reading is received.
    pub recorded_at: Option<Timestamp>,
}

impl DataPoint {
    /// Build a reading for `sensor_id` from request parameters.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] when `value` is missing or not
    /// finite, or when `recorded_at` falls outside the years 0000 to 9999.
    pub fn from_params(
        sensor_id: SensorId,
        params: DataPointParams,
        received_at: Timestamp,
    ) -> Result<Self, LabHubError> {
        let mut errors = ValidationError::new();
        match params.value {
            None => errors.add("value", messages::BLANK),
            Some(v) if !v.is_finite() => errors.add("value", messages::NOT_FINITE),
            Some(_) => {}
        }
        // Stored timestamps must stay four-digit RFC 3339 to sort and parse back.
        if let Some(at) = params.recorded_at
            && !(0..=9999).contains(&at.year())
        {
            errors.add("recorded_at", messages::OUT_OF_RANGE);
        }
        errors.into_result()?;

        Ok(Self {
            id: DataPointId::new(),
            sensor_id,
            value: params.value.unwrap_or_default(),
            recorded_at: params.recorded_at.unwrap_or(received_at),
        })
    }
}

/// How far back to read a sensor's log.
///
/// Both parts are optional and add up; an empty window selects everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataWindow {
    pub days_ago: Option<u32>,
    pub hours_ago: Option<u32>,
}

impl DataWindow {
    /// Lower bound of the window relative to `now`, if any.
    ///
    /// A window reaching past the earliest representable time has no lower
    /// bound.
    #[must_use]
    pub fn since(&self, now: Timestamp) -> Option<Timestamp> {
        if self.days_ago.is_none() && self.hours_ago.is_none() {
            return None;
        }
        let hours = i64::from(self.days_ago.unwrap_or(0)) * 24 + i64::from(self.hours_ago.unwrap_or(0));
        Duration::try_hours(hours).and_then(|span| now.checked_sub_signed(span))
    }
}
