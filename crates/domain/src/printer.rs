//! Printer: a device that print jobs are queued on.

use serde::{Deserialize, Serialize};

use crate::error::{LabHubError, ValidationError, messages};
use crate::id::{PrinterId, UserId};
use crate::time::Timestamp;

/// A 3D printer owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Printer {
    pub id: PrinterId,
    pub name: String,
    pub model: Option<String>,
    pub owner_id: UserId,
    pub created_at: Timestamp,
}

impl Printer {
    /// Create a builder for constructing a [`Printer`].
    #[must_use]
    pub fn builder() -> PrinterBuilder {
        PrinterBuilder::default()
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

/// Whitelisted attributes accepted when creating a printer.
#[derive(Debug, Clone, Default)]
pub struct PrinterParams {
    pub name: Option<String>,
    pub model: Option<String>,
}

/// Step-by-step builder for [`Printer`].
#[derive(Debug, Default)]
pub struct PrinterBuilder {
    id: Option<PrinterId>,
    name: Option<String>,
    model: Option<String>,
    owner_id: Option<UserId>,
    created_at: Option<Timestamp>,
}

impl PrinterBuilder {
    #[must_use]
    pub fn id(mut self, id: PrinterId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
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
    pub fn params(mut self, params: PrinterParams) -> Self {
        self.name = params.name;
        self.model = params.model;
        self
    }

    /// Consume the builder, validate, and return a [`Printer`].
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] if `name` is missing or blank.
    pub fn build(self) -> Result<Printer, LabHubError> {
        let printer = Printer {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            model: self.model,
            owner_id: self.owner_id.unwrap_or_default(),
            created_at: self.created_at.unwrap_or_else(crate::time::now),
        };
        printer.validate()?;
        Ok(printer)
    }
}
