use std::future::Future;

use crate::error::NutriResult;
use crate::jobs::JobId;

/// Trait for persisting the results of completed jobs.
///
/// A result is written once per job and never modified afterward. The JSON payload's key order
/// must survive storage.
pub trait ResultStore {
    /// Stores the result of the job with id `job_id`.
    ///
    /// Fails with [`crate::error::ErrorKind::ResultAlreadyExists`] if a result was already
    /// stored for that job. The result must be fully durable when the returned future
    /// completes, since the job is reported as done right after.
    fn store_job_result(
        &self,
        job_id: JobId,
        result: serde_json::Value,
    ) -> impl Future<Output = NutriResult<()>> + Send;

    /// Returns the result of the job with id `job_id`, [`None`] if none was stored.
    fn get_job_result(
        &self,
        job_id: JobId,
    ) -> impl Future<Output = NutriResult<Option<serde_json::Value>>> + Send;
}
