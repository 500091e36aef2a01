//! Alert: a recorded job status transition.

use serde::{Deserialize, Serialize};

use crate::id::{AlertId, JobId, PrinterId};
use crate::job::StatusChange;
use crate::time::Timestamp;

/// A status transition of a print job, kept for notification history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub job_id: JobId,
    pub printer_id: PrinterId,
    pub from_status: Option<String>,
    pub to_status: Option<String>,
    pub created_at: Timestamp,
}

impl Alert {
    #[must_use]
    pub fn new(job_id: JobId, printer_id: PrinterId, change: StatusChange, at: Timestamp) -> Self {
        Self {
            id: AlertId::new(),
            job_id,
            printer_id,
            from_status: change.from,
            to_status: change.to,
            created_at: at,
        }
    }

    /// One-line summary used in logs.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "job {} changed from {} to {}",
            self.job_id,
            self.from_status.as_deref().unwrap_or("none"),
            self.to_status.as_deref().unwrap_or("none"),
        )
    }
}
