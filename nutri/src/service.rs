//! The job service: admission, dispatch, and status reporting of analytical jobs.

use std::num::NonZeroUsize;
use std::sync::Arc;

use metrics::{counter, gauge};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::aggregation::Aggregator;
use crate::bail;
use crate::concurrency::queue::JobQueue;
use crate::concurrency::shutdown::{ShutdownTx, create_shutdown_channel};
use crate::dataset::Dataset;
use crate::error::{ErrorKind, NutriResult};
use crate::jobs::{Job, JobId, JobIdGenerator, JobStatus, Query, QueryKind, QueryParams};
use crate::metrics::{
    NUTRI_JOB_QUEUE_DEPTH, NUTRI_JOBS_REJECTED_TOTAL, NUTRI_JOBS_SUBMITTED_TOTAL,
    QUERY_KIND_LABEL, register_metrics,
};
use crate::store::results::ResultStore;
use crate::store::status::JobStatusStore;
use crate::workers::compute::ComputeThread;
use crate::workers::job::JobWorker;
use crate::workers::pool::JobWorkerPool;

/// Reason reported when polling an id that was never issued.
pub const INVALID_JOB_ID_REASON: &str = "Invalid job_id";

/// Outcome of polling a job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobPoll {
    Running,
    Done { data: serde_json::Value },
    Error { reason: String },
}

/// Entry point for submitting and tracking analytical jobs.
///
/// [`JobService`] owns the id generator, the job queue and the worker pool, and reads and
/// writes job state through the injected stores. Cloning the service yields another handle to
/// the same jobs and workers.
#[derive(Debug)]
pub struct JobService<S, R> {
    id_generator: Arc<JobIdGenerator>,
    queue: Arc<JobQueue>,
    status_store: S,
    result_store: R,
    /// Whether new submissions are admitted.
    ///
    /// Submissions hold the read lock from the check until their job is queued, and shutdown
    /// takes the write lock to flip it. Every admitted job is thus queued ahead of the sentinel.
    accepting: Arc<RwLock<bool>>,
    shutdown_tx: ShutdownTx,
    pool: JobWorkerPool,
    pool_size: usize,
}

impl<S: Clone, R: Clone> Clone for JobService<S, R> {
    fn clone(&self) -> Self {
        Self {
            id_generator: self.id_generator.clone(),
            queue: self.queue.clone(),
            status_store: self.status_store.clone(),
            result_store: self.result_store.clone(),
            accepting: self.accepting.clone(),
            shutdown_tx: self.shutdown_tx.clone(),
            pool: self.pool.clone(),
            pool_size: self.pool_size,
        }
    }
}

impl<S, R> JobService<S, R>
where
    S: JobStatusStore + Clone + Send + Sync + 'static,
    R: ResultStore + Clone + Send + Sync + 'static,
{
    /// Starts a service with `pool_size` workers executing queries against `dataset`.
    ///
    /// The pool never exceeds the host's available parallelism, larger sizes are clamped.
    pub async fn start(
        dataset: Arc<Dataset>,
        pool_size: usize,
        status_store: S,
        result_store: R,
    ) -> NutriResult<Self> {
        if pool_size == 0 {
            bail!(
                ErrorKind::ConfigError,
                "Invalid worker pool size",
                "the worker pool needs at least one worker"
            );
        }

        let available = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        let pool_size = if pool_size > available {
            warn!(
                requested = pool_size,
                available, "worker pool size exceeds available parallelism, clamping"
            );
            available
        } else {
            pool_size
        };

        register_metrics();

        // Compute threads are created upfront, so a failure does not leave a partial pool behind.
        let compute_threads = (0..pool_size)
            .map(|worker_id| ComputeThread::spawn(format!("nutri-compute-{worker_id}")))
            .collect::<NutriResult<Vec<_>>>()?;

        let queue = Arc::new(JobQueue::new());
        let (shutdown_tx, _) = create_shutdown_channel();
        let aggregator = Aggregator::new(dataset);

        let pool = JobWorkerPool::new();
        for (worker_id, compute) in compute_threads.into_iter().enumerate() {
            let worker = JobWorker::new(
                worker_id,
                aggregator.clone(),
                compute,
                queue.clone(),
                status_store.clone(),
                result_store.clone(),
                shutdown_tx.clone(),
            );
            pool.spawn(worker_id, worker.run()).await;
        }

        info!(pool_size, "job service started");

        Ok(Self {
            id_generator: Arc::new(JobIdGenerator::new()),
            queue,
            status_store,
            result_store,
            accepting: Arc::new(RwLock::new(true)),
            shutdown_tx,
            pool,
            pool_size,
        })
    }

    /// Returns the number of workers of the pool.
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Returns `true` while new submissions are admitted.
    pub async fn is_accepting(&self) -> bool {
        *self.accepting.read().await
    }

    /// Validates and submits a query of `kind`, returning the id of the queued job.
    pub async fn submit(&self, kind: QueryKind, params: QueryParams) -> NutriResult<JobId> {
        let query = Query::new(kind, params)?;
        self.submit_query(query).await
    }

    /// Submits `query`, returning the id of the queued job.
    ///
    /// Fails with [`ErrorKind::ShuttingDown`] once shutdown has been initiated. The job is
    /// recorded as running before it becomes visible to workers.
    pub async fn submit_query(&self, query: Query) -> NutriResult<JobId> {
        let accepting = self.accepting.read().await;
        let query_kind = query.kind();

        if !*accepting {
            counter!(NUTRI_JOBS_REJECTED_TOTAL, QUERY_KIND_LABEL => query_kind.as_str())
                .increment(1);
            bail!(
                ErrorKind::ShuttingDown,
                "The service is shutting down",
                "new jobs are no longer accepted"
            );
        }

        let job_id = self.id_generator.next();
        self.status_store
            .update_job_status(job_id, JobStatus::Running)
            .await?;
        self.queue.enqueue(Job::query(job_id, query)).await;

        counter!(NUTRI_JOBS_SUBMITTED_TOTAL, QUERY_KIND_LABEL => query_kind.as_str()).increment(1);
        gauge!(NUTRI_JOB_QUEUE_DEPTH).set(self.queue.len().await as f64);
        debug!(%job_id, %query_kind, "job submitted");

        Ok(job_id)
    }

    /// Returns the current state of the job with id `job_id`.
    ///
    /// Ids outside of `[1, highest issued id]` are reported as an error with reason
    /// [`INVALID_JOB_ID_REASON`].
    pub async fn poll(&self, job_id: JobId) -> NutriResult<JobPoll> {
        if job_id.is_sentinel() || job_id > self.id_generator.current() {
            return Ok(JobPoll::Error {
                reason: INVALID_JOB_ID_REASON.to_owned(),
            });
        }

        // A missing entry belongs to a submission that has its id but is not registered yet.
        let poll = match self.status_store.get_job_status(job_id).await? {
            None | Some(JobStatus::Running) => JobPoll::Running,
            Some(JobStatus::Failed { reason }) => JobPoll::Error { reason },
            Some(JobStatus::Done) => match self.result_store.get_job_result(job_id).await? {
                Some(data) => JobPoll::Done { data },
                None => bail!(
                    ErrorKind::ResultMissing,
                    "Result of a completed job is missing",
                    format!("job {job_id} is done but has no stored result")
                ),
            },
        };

        Ok(poll)
    }

    /// Returns every known job with its status, ordered by id.
    pub async fn list_jobs(&self) -> NutriResult<Vec<(JobId, JobStatus)>> {
        let statuses = self.status_store.get_job_statuses().await?;

        Ok(statuses.into_iter().collect())
    }

    /// Returns the number of jobs that did not finish yet.
    pub async fn count_pending(&self) -> NutriResult<usize> {
        self.status_store.count_pending_jobs().await
    }

    /// Stops admitting submissions and queues the shutdown sentinel behind admitted jobs.
    ///
    /// Only the first call queues a sentinel: its worker stops the whole pool, so a later
    /// sentinel would never be consumed. Later calls only report the status.
    ///
    /// Returns [`JobStatus::Done`] if at most the sentinel was queued at the time of the check,
    /// [`JobStatus::Running`] otherwise. This is a snapshot, workers may still be executing jobs
    /// they already took from the queue.
    pub async fn initiate_shutdown(&self) -> NutriResult<JobStatus> {
        let mut accepting = self.accepting.write().await;

        if *accepting {
            *accepting = false;

            self.status_store
                .update_job_status(JobId::SENTINEL, JobStatus::Running)
                .await?;
            self.queue.enqueue(Job::shutdown()).await;

            info!("graceful shutdown initiated");
        } else {
            debug!("graceful shutdown already initiated");
        }

        let queued = self.queue.len().await;
        drop(accepting);

        if queued <= 1 {
            Ok(JobStatus::Done)
        } else {
            Ok(JobStatus::Running)
        }
    }

    /// Returns `true` once a worker consumed the shutdown sentinel.
    pub fn is_shut_down(&self) -> bool {
        self.shutdown_tx.is_shutdown()
    }

    /// Waits for every worker to stop.
    ///
    /// Workers only stop after [`JobService::initiate_shutdown`] was called, so this is meant to
    /// be awaited after it.
    pub async fn wait(&self) -> NutriResult<()> {
        self.pool.wait_all().await?;

        info!("all job workers stopped");

        Ok(())
    }
}
