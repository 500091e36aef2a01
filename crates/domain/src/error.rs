//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`LabHubError`] via `From`.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Top-level error returned by domain and application operations.
#[derive(Debug, thiserror::Error)]
pub enum LabHubError {
    #[error("validation failed")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error("authentication required")]
    Unauthorized,

    #[error(transparent)]
    Forbidden(#[from] ForbiddenError),

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("upload storage error")]
    Upload(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("task queue is closed")]
    QueueClosed,
}

/// Field-level validation failures, keyed by attribute name.
///
/// Serializes as `{"field": ["message", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationError {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shortcut for an error on a single field.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut err = Self::new();
        err.add(field, message);
        err
    }

    /// Record a message against `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Messages recorded for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded, the error otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] when at least one field failed.
    pub fn into_result(self) -> Result<(), LabHubError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into())
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            for message in messages {
                if !first {
                    f.write_str(", ")?;
                }
                write!(f, "{field} {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// A lookup by id found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// The authenticated user may not perform the action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not allowed to {action} {resource}")]
pub struct ForbiddenError {
    pub action: crate::ability::Action,
    pub resource: &'static str,
}

/// Validation messages shared by the record types.
pub mod messages {
    pub const BLANK: &str = "can't be blank";
    pub const NEGATIVE: &str = "must be greater than or equal to 0";
    pub const TAKEN: &str = "has already been taken";
    pub const NOT_FINITE: &str = "must be a finite number";
    pub const INVALID: &str = "is invalid";
    pub const OUT_OF_RANGE: &str = "is out of range";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_collect_messages_per_field() {
        let mut err = ValidationError::new();
        err.add("name", messages::BLANK);
        err.add("name", messages::INVALID);
        err.add("pin", messages::NEGATIVE);

        assert_eq!(err.get("name").unwrap().len(), 2);
        assert_eq!(err.get("pin").unwrap(), [messages::NEGATIVE.to_string()]);
        assert!(err.get("model").is_none());
    }

    #[test]
    fn should_be_ok_when_nothing_recorded() {
        assert!(ValidationError::new().into_result().is_ok());
    }

    #[test]
    fn should_serialize_as_field_map() {
        let err = ValidationError::single("friendly_id", messages::BLANK);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!({"friendly_id": ["can't be blank"]}));
    }

    #[test]
    fn should_display_field_and_message() {
        let err = ValidationError::single("name", messages::BLANK);
        assert_eq!(err.to_string(), "name can't be blank");
    }
}
