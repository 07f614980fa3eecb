use std::collections::BTreeMap;
use std::future::Future;

use crate::error::NutriResult;
use crate::jobs::{JobId, JobStatus};

/// Trait for storing and retrieving the lifecycle state of jobs.
///
/// [`JobStatusStore`] implementations hold exactly one entry per known job id. Implementations
/// must be safe to use concurrently from producers and workers.
pub trait JobStatusStore {
    /// Returns the status of the job with id `job_id`, [`None`] if no entry exists.
    fn get_job_status(
        &self,
        job_id: JobId,
    ) -> impl Future<Output = NutriResult<Option<JobStatus>>> + Send;

    /// Returns the status of every known job, ordered by job id.
    fn get_job_statuses(
        &self,
    ) -> impl Future<Output = NutriResult<BTreeMap<JobId, JobStatus>>> + Send;

    /// Creates or replaces the status of the job with id `job_id`.
    fn update_job_status(
        &self,
        job_id: JobId,
        status: JobStatus,
    ) -> impl Future<Output = NutriResult<()>> + Send;

    /// Removes the entry of the job with id `job_id`, returning the removed status.
    fn delete_job_status(
        &self,
        job_id: JobId,
    ) -> impl Future<Output = NutriResult<Option<JobStatus>>> + Send;

    /// Returns the number of jobs that have not reached a terminal status.
    fn count_pending_jobs(&self) -> impl Future<Output = NutriResult<usize>> + Send;
}
