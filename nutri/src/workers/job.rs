use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use tracing::{Instrument, debug, error, info, warn};

use crate::aggregation::Aggregator;
use crate::concurrency::queue::JobQueue;
use crate::concurrency::shutdown::ShutdownTx;
use crate::error::NutriResult;
use crate::jobs::{Job, JobId, JobStatus, JobTask, Query, QueryKind};
use crate::metrics::{
    ERROR_KIND_LABEL, NUTRI_JOB_DURATION_SECONDS, NUTRI_JOB_QUEUE_DEPTH,
    NUTRI_JOBS_COMPLETED_TOTAL, NUTRI_JOBS_FAILED_TOTAL, QUERY_KIND_LABEL,
};
use crate::store::results::ResultStore;
use crate::store::status::JobStatusStore;
use crate::workers::compute::ComputeThread;

/// Worker that executes jobs taken from the shared [`JobQueue`].
///
/// A job that fails, either because the aggregation panicked or because its result could not
/// be stored, is marked as [`JobStatus::Failed`] and the worker moves on to the next job.
#[derive(Debug)]
pub struct JobWorker<S, R> {
    worker_id: usize,
    aggregator: Aggregator,
    compute: ComputeThread,
    queue: Arc<JobQueue>,
    status_store: S,
    result_store: R,
    shutdown_tx: ShutdownTx,
}

impl<S, R> JobWorker<S, R>
where
    S: JobStatusStore + Clone + Send + Sync + 'static,
    R: ResultStore + Clone + Send + Sync + 'static,
{
    pub fn new(
        worker_id: usize,
        aggregator: Aggregator,
        compute: ComputeThread,
        queue: Arc<JobQueue>,
        status_store: S,
        result_store: R,
        shutdown_tx: ShutdownTx,
    ) -> Self {
        Self {
            worker_id,
            aggregator,
            compute,
            queue,
            status_store,
            result_store,
            shutdown_tx,
        }
    }

    /// Runs the worker until it consumes the shutdown sentinel or, once shutdown has been
    /// signaled by another worker, until the queue is empty.
    pub async fn run(self) -> NutriResult<()> {
        let worker_span = tracing::info_span!("job_worker", worker_id = self.worker_id);

        async move {
            debug!("job worker started");

            let mut shutdown_rx = self.shutdown_tx.subscribe();
            loop {
                let job = tokio::select! {
                    biased;

                    job = self.queue.dequeue() => job,

                    _ = shutdown_rx.wait() => {
                        // Jobs that are still queued were admitted before the sentinel, so we
                        // drain them before stopping.
                        match self.queue.try_dequeue().await {
                            Some(job) => job,
                            None => break,
                        }
                    }
                };

                gauge!(NUTRI_JOB_QUEUE_DEPTH).set(self.queue.len().await as f64);

                match job.task {
                    JobTask::Shutdown => {
                        self.handle_shutdown(job.id).await?;
                        break;
                    }
                    JobTask::Query(query) => self.handle_query(job.id, query).await,
                }
            }

            debug!("job worker stopped");

            Ok(())
        }
        .instrument(worker_span)
        .await
    }

    /// Stops the pool and removes the sentinel's status entry.
    async fn handle_shutdown(&self, job_id: JobId) -> NutriResult<()> {
        info!("shutdown sentinel received, stopping worker pool");

        self.shutdown_tx.shutdown();
        self.status_store.delete_job_status(job_id).await?;

        Ok(())
    }

    /// Executes `query`, stores its result and records the job's final status.
    async fn handle_query(&self, job_id: JobId, query: Query) {
        let query_kind = query.kind();
        let started_at = Instant::now();

        let outcome = self.execute(job_id, query).await;

        histogram!(NUTRI_JOB_DURATION_SECONDS, QUERY_KIND_LABEL => query_kind.as_str())
            .record(started_at.elapsed().as_secs_f64());

        self.record_outcome(job_id, query_kind, outcome).await;
    }

    /// Records the final status of a job from the outcome of its execution.
    async fn record_outcome(
        &self,
        job_id: JobId,
        query_kind: QueryKind,
        outcome: NutriResult<()>,
    ) {
        let status = match outcome {
            Ok(()) => {
                counter!(NUTRI_JOBS_COMPLETED_TOTAL, QUERY_KIND_LABEL => query_kind.as_str())
                    .increment(1);
                debug!(%job_id, %query_kind, "job completed");

                JobStatus::Done
            }
            Err(err) => {
                counter!(
                    NUTRI_JOBS_FAILED_TOTAL,
                    QUERY_KIND_LABEL => query_kind.as_str(),
                    ERROR_KIND_LABEL => format!("{:?}", err.kind())
                )
                .increment(1);
                error!(%job_id, %query_kind, error = %err, "job failed");

                JobStatus::Failed {
                    reason: err.summary(),
                }
            }
        };

        // The status is only flipped after the result is stored, so a client never sees a
        // finished job without its result.
        if let Err(err) = self.status_store.update_job_status(job_id, status).await {
            warn!(%job_id, error = %err, "failed to record job status");
        }
    }

    async fn execute(&self, job_id: JobId, query: Query) -> NutriResult<()> {
        let aggregator = self.aggregator.clone();

        // Aggregations are CPU bound and stay off the async runtime threads.
        let result = self.compute.run(move || aggregator.run(&query)).await?;

        let payload = result.to_json()?;
        self.result_store.store_job_result(job_id, payload).await
    }
}
