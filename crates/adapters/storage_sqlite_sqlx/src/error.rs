//! Errors of the `SQLite` adapter and their mapping into [`LabHubError`].

use labhub_domain::error::LabHubError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query, connection or row decode failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// The job `data` document could not be encoded for its JSON text
    /// column. A stored document that fails to decode is reported by sqlx
    /// as a row decode error under [`StorageError::Database`].
    #[error("job document could not be encoded as JSON")]
    JobDocument(#[from] serde_json::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for LabHubError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_keep_job_document_cause_behind_storage_error() {
        let cause = serde_json::from_str::<serde_json::Value>("{").unwrap_err();

        let err = LabHubError::from(StorageError::from(cause));

        let LabHubError::Storage(source) = err else {
            panic!("expected storage error");
        };
        assert_eq!(source.to_string(), "job document could not be encoded as JSON");
        assert!(source.source().is_some());
    }
}
