//! Hub: a gateway device grouping one or more sensors.

use serde::{Deserialize, Serialize};

use crate::error::{LabHubError, ValidationError, messages};
use crate::id::{HubId, UserId};
use crate::time::Timestamp;

/// A sensor gateway owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hub {
    pub id: HubId,
    pub name: String,
    pub location: Option<String>,
    pub owner_id: UserId,
    pub created_at: Timestamp,
}

impl Hub {
    /// Create a builder for constructing a [`Hub`].
    #[must_use]
    pub fn builder() -> HubBuilder {
        HubBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] when `name` is blank.
    pub fn validate(&self) -> Result<(), LabHubError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::single("name", messages::BLANK).into());
        }
        Ok(())
    }
}

/// Whitelisted attributes accepted when creating a hub.
#[derive(Debug, Clone, Default)]
pub struct HubParams {
    pub name: Option<String>,
    pub location: Option<String>,
}

/// Step-by-step builder for [`Hub`].
#[derive(Debug, Default)]
pub struct HubBuilder {
    id: Option<HubId>,
    name: Option<String>,
    location: Option<String>,
    owner_id: Option<UserId>,
    created_at: Option<Timestamp>,
}

impl HubBuilder {
    #[must_use]
    pub fn id(mut self, id: HubId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn owner_id(mut self, owner_id: UserId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = Some(created_at);
        self
    }

    #[must_use]
    pub fn params(mut self, params: HubParams) -> Self {
        self.name = params.name;
        self.location = params.location;
        self
    }

    /// Consume the builder, validate, and return a [`Hub`].
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] if `name` is missing or blank.
    pub fn build(self) -> Result<Hub, LabHubError> {
        let hub = Hub {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            location: self.location,
            owner_id: self.owner_id.unwrap_or_default(),
            created_at: self.created_at.unwrap_or_else(crate::time::now),
        };
        hub.validate()?;
        Ok(hub)
    }
}
