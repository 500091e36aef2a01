//! Job: a print job queued on a [`Printer`](crate::printer::Printer).
//!
//! The progress document (`data`) is reported by the printer host and is
//! replaced wholesale on update. Its `status` drives alerting: any change
//! between the stored and the submitted status is surfaced as a
//! [`StatusChange`].

use serde::{Deserialize, Serialize};

use crate::error::{LabHubError, ValidationError, messages};
use crate::id::{JobId, PrinterId, UserId};
use crate::time::Timestamp;

/// Status recorded before a freshly created job reaches the printer host.
pub const STATUS_CREATED: &str = "created";
/// Status a job is reported in right after creation.
pub const STATUS_PROCESSING: &str = "processing";
/// Status set once a cancellation went through.
pub const STATUS_CANCELLED: &str = "cancelled";

/// A print job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub printer_id: PrinterId,
    /// Storage key of the uploaded model file, if any.
    pub model: Option<String>,
    pub model_file_name: Option<String>,
    pub data: JobData,
    pub created_by_user_id: UserId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Progress document of a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<JobFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filament: Option<Filament>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_print_time: Option<f64>,
}

/// The file being printed, as known by the printer host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobFile {
    /// Upload time on the host, in seconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

/// Filament usage estimate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filament {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

/// Live print progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_position: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print_time: Option<f64>,
    /// Percentage, `0..=100`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print_time_left: Option<f64>,
}

/// Whitelisted attributes accepted on create and update.
#[derive(Debug, Clone, Default)]
pub struct JobParams {
    pub model_file_name: Option<String>,
    pub data: Option<JobData>,
}

/// Status before and after an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl StatusChange {
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.from != self.to
    }
}

impl Job {
    /// Create a builder for constructing a [`Job`].
    #[must_use]
    pub fn builder() -> JobBuilder {
        JobBuilder::default()
    }

    /// Current status reported in the progress document.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.data.status.as_deref()
    }

    /// Apply whitelisted parameters, returning the status transition.
    ///
    /// A supplied `data` document replaces the stored one, so a document
    /// without `status` clears it.
    pub fn apply(&mut self, params: JobParams, at: Timestamp) -> StatusChange {
        let from = self.data.status.clone();
        if let Some(name) = params.model_file_name {
            self.model_file_name = Some(name);
        }
        if let Some(data) = params.data {
            self.data = data;
        }
        self.updated_at = at;
        StatusChange {
            from,
            to: self.data.status.clone(),
        }
    }

    /// Overwrite the status only, returning the transition.
    pub fn set_status(&mut self, status: impl Into<String>, at: Timestamp) -> StatusChange {
        let from = self.data.status.replace(status.into());
        self.updated_at = at;
        StatusChange {
            from,
            to: self.data.status.clone(),
        }
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] with one entry per invalid field.
    pub fn validate(&self) -> Result<(), LabHubError> {
        let mut errors = ValidationError::new();
        if self
            .model_file_name
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            errors.add("model_file_name", messages::BLANK);
        }
        self.data.validate_into(&mut errors);
        errors.into_result()
    }
}

impl JobData {
    fn validate_into(&self, errors: &mut ValidationError) {
        if self
            .status
            .as_deref()
            .is_some_and(|status| status.trim().is_empty())
        {
            errors.add("data.status", messages::BLANK);
        }
        if let Some(file) = &self.file {
            non_negative(errors, "data.file.size", file.size);
        }
        if let Some(filament) = &self.filament {
            non_negative(errors, "data.filament.length", filament.length);
            non_negative(errors, "data.filament.volume", filament.volume);
        }
        if let Some(progress) = &self.progress {
            non_negative(errors, "data.progress.file_position", progress.file_position);
            non_negative(errors, "data.progress.print_time", progress.print_time);
            non_negative(
                errors,
                "data.progress.print_time_left",
                progress.print_time_left,
            );
            if let Some(completion) = progress.completion {
                if completion < 0.0 {
                    errors.add("data.progress.completion", messages::NEGATIVE);
                } else if completion > 100.0 {
                    errors.add(
                        "data.progress.completion",
                        "must be less than or equal to 100",
                    );
                }
            }
        }
        non_negative(
            errors,
            "data.estimated_print_time",
            self.estimated_print_time,
        );
    }
}

pub(crate) fn non_negative<T>(errors: &mut ValidationError, field: &str, value: Option<T>)
where
    T: PartialOrd + Default,
{
    if value.is_some_and(|v| v < T::default()) {
        errors.add(field, messages::NEGATIVE);
    }
}

/// Step-by-step builder for [`Job`].
#[derive(Debug, Default)]
pub struct JobBuilder {
    id: Option<JobId>,
    printer_id: Option<PrinterId>,
    model_file_name: Option<String>,
    data: JobData,
    created_by_user_id: Option<UserId>,
    created_at: Option<Timestamp>,
}

impl JobBuilder {
    #[must_use]
    pub fn id(mut self, id: JobId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn printer_id(mut self, printer_id: PrinterId) -> Self {
        self.printer_id = Some(printer_id);
        self
    }

    #[must_use]
    pub fn model_file_name(mut self, name: impl Into<String>) -> Self {
        self.model_file_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn data(mut self, data: JobData) -> Self {
        self.data = data;
        self
    }

    #[must_use]
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.data.status = Some(status.into());
        self
    }

    #[must_use]
    pub fn created_by_user_id(mut self, user_id: UserId) -> Self {
        self.created_by_user_id = Some(user_id);
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = Some(created_at);
        self
    }

    #[must_use]
    pub fn params(mut self, params: JobParams) -> Self {
        self.model_file_name = params.model_file_name;
        self.data = params.data.unwrap_or_default();
        self
    }

    /// Consume the builder, validate, and return a [`Job`].
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] if invariants fail.
    pub fn build(self) -> Result<Job, LabHubError> {
        let created_at = self.created_at.unwrap_or_else(crate::time::now);
        let job = Job {
            id: self.id.unwrap_or_default(),
            printer_id: self.printer_id.unwrap_or_default(),
            model: None,
            model_file_name: self.model_file_name,
            data: self.data,
            created_by_user_id: self.created_by_user_id.unwrap_or_default(),
            created_at,
            updated_at: created_at,
        };
        job.validate()?;
        Ok(job)
    }
}
