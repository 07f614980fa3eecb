use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::bail;
use crate::error::{ErrorKind, NutriResult};
use crate::jobs::JobId;
use crate::nutri_error;
use crate::store::results::ResultStore;

/// Result store writing one JSON file per job, named after the job id.
///
/// Each result is first written to a hidden temporary file in the same directory and then
/// renamed into place, so a reader either sees the complete file or no file at all.
#[derive(Debug, Clone)]
pub struct FilesystemResultStore {
    directory: PathBuf,
}

impl FilesystemResultStore {
    /// Opens the store rooted at `directory`, creating the directory if needed.
    pub async fn open<P: AsRef<Path>>(directory: P) -> NutriResult<Self> {
        let directory = directory.as_ref().to_path_buf();

        tokio::fs::create_dir_all(&directory).await.map_err(|err| {
            nutri_error!(
                ErrorKind::IoError,
                "Failed to create the results directory",
                directory.display(),
                source: err
            )
        })?;

        Ok(Self { directory })
    }

    /// Returns the directory results are written to.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn result_path(&self, job_id: JobId) -> PathBuf {
        self.directory.join(job_id.to_string())
    }

    fn temporary_path(&self, job_id: JobId) -> PathBuf {
        self.directory.join(format!(".{job_id}.tmp"))
    }
}

impl ResultStore for FilesystemResultStore {
    async fn store_job_result(&self, job_id: JobId, result: serde_json::Value) -> NutriResult<()> {
        let path = self.result_path(job_id);

        if tokio::fs::try_exists(&path).await? {
            bail!(
                ErrorKind::ResultAlreadyExists,
                "Job result already stored",
                path.display()
            );
        }

        let payload = serde_json::to_vec(&result).map_err(|err| {
            nutri_error!(
                ErrorKind::SerializationError,
                "Job result serialization failed",
                &err,
                source: err
            )
        })?;
        let temporary_path = self.temporary_path(job_id);

        tokio::fs::write(&temporary_path, payload).await?;
        tokio::fs::rename(&temporary_path, &path).await?;

        debug!(%job_id, path = %path.display(), "stored job result");

        Ok(())
    }

    async fn get_job_result(&self, job_id: JobId) -> NutriResult<Option<serde_json::Value>> {
        let payload = match tokio::fs::read(self.result_path(job_id)).await {
            Ok(payload) => payload,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        Ok(Some(serde_json::from_slice(&payload)?))
    }
}
