//! Model file store port: keeps uploaded print model files.

use std::future::Future;

use labhub_domain::error::LabHubError;
use labhub_domain::id::JobId;

/// Storage for the model file attached to a job.
///
/// Files are private: they are only ever handed out through an
/// authorized request, never served from a public directory.
pub trait ModelFileStore {
    /// Store `bytes` for `job_id` and return the storage key.
    fn store(
        &self,
        job_id: JobId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<String, LabHubError>> + Send;

    /// Read a previously stored file back.
    fn load(&self, key: &str) -> impl Future<Output = Result<Vec<u8>, LabHubError>> + Send;

    /// Remove a stored file. Missing files are not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), LabHubError>> + Send;
}
