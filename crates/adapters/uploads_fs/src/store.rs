//! [`ModelFileStore`] backed by the local filesystem.

use std::future::Future;
use std::path::{Component, Path, PathBuf};

use labhub_app::ports::ModelFileStore;
use labhub_domain::error::LabHubError;
use labhub_domain::id::JobId;
use tokio::io::AsyncWriteExt;

use crate::error::UploadError;

const UPLOADS_DIR: &str = "uploads";
const TMP_DIR: &str = "tmp";
const DIR_MODE: u32 = 0o700;
const FILE_MODE: u32 = 0o600;

/// Stores job model files below a private root directory.
#[derive(Debug, Clone)]
pub struct FsModelStore {
    root: PathBuf,
}

impl FsModelStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the upload and temporary directories.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Io`] when a directory cannot be created.
    pub async fn prepare(&self) -> Result<(), UploadError> {
        create_private_dir(&self.tmp_dir()).await
    }

    fn tmp_dir(&self) -> PathBuf {
        self.root.join(UPLOADS_DIR).join(TMP_DIR)
    }

    /// Map a storage key back to an absolute path, refusing anything that
    /// escapes the upload directory.
    fn resolve(&self, key: &str) -> Result<PathBuf, UploadError> {
        let relative = Path::new(key);
        let mut components = relative.components();
        let inside_uploads = components
            .next()
            .is_some_and(|first| first == Component::Normal(UPLOADS_DIR.as_ref()));
        if !inside_uploads || !components.all(|c| matches!(c, Component::Normal(_))) {
            return Err(UploadError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }

    async fn write(
        &self,
        job_id: JobId,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, UploadError> {
        let name = sanitize_file_name(file_name)?;
        let key = format!("{UPLOADS_DIR}/job/model/{job_id}/{name}");
        let target = self.root.join(&key);
        let Some(dir) = target.parent() else {
            return Err(UploadError::InvalidKey(key));
        };

        create_private_dir(dir).await?;
        create_private_dir(&self.tmp_dir()).await?;

        let staging = self.tmp_dir().join(format!("{}.part", uuid::Uuid::new_v4()));
        if let Err(err) = write_private_file(&staging, bytes).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(err);
        }
        tokio::fs::rename(&staging, &target)
            .await
            .map_err(UploadError::io(&target))?;

        tracing::debug!(key = %key, size = bytes.len(), "stored model file");
        Ok(key)
    }
}

impl ModelFileStore for FsModelStore {
    fn store(
        &self,
        job_id: JobId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<String, LabHubError>> + Send {
        let file_name = file_name.to_string();
        async move { Ok(self.write(job_id, &file_name, &bytes).await?) }
    }

    fn load(&self, key: &str) -> impl Future<Output = Result<Vec<u8>, LabHubError>> + Send {
        let path = self.resolve(key);
        async move {
            let path = path?;
            let bytes = tokio::fs::read(&path).await.map_err(UploadError::io(&path))?;
            Ok(bytes)
        }
    }

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), LabHubError>> + Send {
        let path = self.resolve(key);
        async move {
            let path = path?;
            match tokio::fs::remove_file(&path).await {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(UploadError::io(&path)(err).into()),
            }
        }
    }
}

/// Keep only the final path segment and replace anything outside
/// `[A-Za-z0-9._-]`.
fn sanitize_file_name(file_name: &str) -> Result<String, UploadError> {
    let last = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        return Err(UploadError::InvalidFileName(file_name.to_string()));
    }
    Ok(cleaned.to_string())
}

async fn create_private_dir(path: &Path) -> Result<(), UploadError> {
    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(DIR_MODE);
    builder.create(path).await.map_err(UploadError::io(path))
}

async fn write_private_file(path: &Path, bytes: &[u8]) -> Result<(), UploadError> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(FILE_MODE);

    let mut file = options.open(path).await.map_err(UploadError::io(path))?;
    file.write_all(bytes).await.map_err(UploadError::io(path))?;
    file.sync_all().await.map_err(UploadError::io(path))
}
