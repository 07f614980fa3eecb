use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::bail;
use crate::error::{ErrorKind, NutriResult};
use crate::jobs::{JobId, JobStatus};
use crate::store::results::ResultStore;
use crate::store::status::JobStatusStore;

/// Inner state of [`MemoryStore`].
#[derive(Debug, Default)]
struct Inner {
    /// Current status of each known job.
    job_statuses: BTreeMap<JobId, JobStatus>,
    /// Results of completed jobs, written once.
    job_results: HashMap<JobId, serde_json::Value>,
}

/// In-memory storage for job statuses and results.
///
/// [`MemoryStore`] implements both [`JobStatusStore`] and [`ResultStore`]. Everything is lost
/// when the process exits, which matches the lifetime of job statuses and makes the store a
/// good fit for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Creates a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStatusStore for MemoryStore {
    async fn get_job_status(&self, job_id: JobId) -> NutriResult<Option<JobStatus>> {
        let inner = self.inner.lock().await;

        Ok(inner.job_statuses.get(&job_id).cloned())
    }

    async fn get_job_statuses(&self) -> NutriResult<BTreeMap<JobId, JobStatus>> {
        let inner = self.inner.lock().await;

        Ok(inner.job_statuses.clone())
    }

    async fn update_job_status(&self, job_id: JobId, status: JobStatus) -> NutriResult<()> {
        let mut inner = self.inner.lock().await;
        inner.job_statuses.insert(job_id, status);

        Ok(())
    }

    async fn delete_job_status(&self, job_id: JobId) -> NutriResult<Option<JobStatus>> {
        let mut inner = self.inner.lock().await;

        Ok(inner.job_statuses.remove(&job_id))
    }

    async fn count_pending_jobs(&self) -> NutriResult<usize> {
        let inner = self.inner.lock().await;

        Ok(inner
            .job_statuses
            .values()
            .filter(|status| !status.is_terminal())
            .count())
    }
}

impl ResultStore for MemoryStore {
    async fn store_job_result(&self, job_id: JobId, result: serde_json::Value) -> NutriResult<()> {
        let mut inner = self.inner.lock().await;

        if inner.job_results.contains_key(&job_id) {
            bail!(
                ErrorKind::ResultAlreadyExists,
                "Job result already stored",
                format!("a result for job {job_id} was already stored")
            );
        }

        inner.job_results.insert(job_id, result);

        Ok(())
    }

    async fn get_job_result(&self, job_id: JobId) -> NutriResult<Option<serde_json::Value>> {
        let inner = self.inner.lock().await;

        Ok(inner.job_results.get(&job_id).cloned())
    }
}
