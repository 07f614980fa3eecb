use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::error::{ErrorKind, NutriResult};
use crate::nutri_error;

/// Internal state for [`JobWorkerPool`].
#[derive(Debug)]
struct JobWorkerPoolInner {
    /// Owns all spawned worker tasks.
    join_set: JoinSet<(usize, NutriResult<()>)>,
    /// Number of workers spawned since the pool was created.
    spawned: usize,
}

/// Pool owning the long-lived job worker tasks.
///
/// Workers are spawned once when the service starts and are never replaced. The pool can be
/// cloned cheaply, all clones refer to the same set of tasks.
#[derive(Debug, Clone)]
pub struct JobWorkerPool {
    inner: Arc<Mutex<JobWorkerPoolInner>>,
}

impl JobWorkerPool {
    /// Creates a new empty job worker pool.
    pub fn new() -> Self {
        let inner = JobWorkerPoolInner {
            join_set: JoinSet::new(),
            spawned: 0,
        };

        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Spawns a worker future into the pool.
    pub async fn spawn<F>(&self, worker_id: usize, future: F)
    where
        F: Future<Output = NutriResult<()>> + Send + 'static,
    {
        let mut inner = self.inner.lock().await;
        inner.join_set.spawn(async move {
            let result = future.await;
            (worker_id, result)
        });
        inner.spawned += 1;

        debug!(worker_id, "spawned job worker in pool");
    }

    /// Returns the number of workers spawned into the pool.
    pub async fn size(&self) -> usize {
        self.inner.lock().await.spawned
    }

    /// Waits for all workers to complete.
    ///
    /// Errors returned by workers, as well as panics and cancellations of worker tasks, are
    /// collected and returned together once every worker has stopped.
    pub async fn wait_all(&self) -> NutriResult<()> {
        let mut errors = Vec::new();

        loop {
            let result = {
                let mut inner = self.inner.lock().await;
                inner.join_set.join_next().await
            };

            let Some(result) = result else {
                // JoinSet is empty, all workers have completed.
                break;
            };

            match result {
                Ok((worker_id, Ok(()))) => {
                    debug!(worker_id, "job worker completed");
                }
                Ok((worker_id, Err(err))) => {
                    error!(worker_id, error = %err, "job worker completed with error");
                    errors.push(err);
                }
                Err(join_err) => {
                    if join_err.is_cancelled() {
                        errors.push(nutri_error!(
                            ErrorKind::JobWorkerCancelled,
                            "Job worker was cancelled",
                            join_err
                        ));
                    } else {
                        errors.push(nutri_error!(
                            ErrorKind::JobWorkerPanic,
                            "Job worker panicked",
                            join_err
                        ));
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.into())
        }
    }
}

impl Default for JobWorkerPool {
    fn default() -> Self {
        Self::new()
    }
}
