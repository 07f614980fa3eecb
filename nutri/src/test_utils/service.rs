//! Helpers for driving a [`JobService`] in tests.

use std::time::Duration;

use crate::jobs::JobId;
use crate::service::{JobPoll, JobService};
use crate::store::results::ResultStore;
use crate::store::status::JobStatusStore;

/// Polls `job_id` until it stops running, panicking after `timeout`.
pub async fn wait_for_job<S, R>(
    service: &JobService<S, R>,
    job_id: JobId,
    timeout: Duration,
) -> JobPoll
where
    S: JobStatusStore + Clone + Send + Sync + 'static,
    R: ResultStore + Clone + Send + Sync + 'static,
{
    tokio::time::timeout(timeout, async {
        loop {
            let poll = service.poll(job_id).await.unwrap();
            if poll != JobPoll::Running {
                return poll;
            }

            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("job {job_id} did not finish within {timeout:?}"))
}
