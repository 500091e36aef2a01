//! Upload storage error type.

use std::path::PathBuf;

use labhub_domain::error::{LabHubError, NotFoundError, ValidationError, messages};

/// Errors originating from the upload store.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// A filesystem operation failed.
    #[error("io error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The client-supplied file name has no usable characters.
    #[error("invalid file name {0:?}")]
    InvalidFileName(String),

    /// The storage key does not point inside the upload directory.
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
}

impl UploadError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

impl From<UploadError> for LabHubError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::InvalidFileName(_) => {
                ValidationError::single("model_file_name", messages::INVALID).into()
            }
            UploadError::InvalidKey(key) => NotFoundError {
                entity: "Model",
                id: key,
            }
            .into(),
            // Never echo server paths back to clients.
            UploadError::Io { path, source } if source.kind() == std::io::ErrorKind::NotFound => {
                NotFoundError {
                    entity: "Model",
                    id: path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                }
                .into()
            }
            err => Self::Upload(Box::new(err)),
        }
    }
}
