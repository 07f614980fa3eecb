use std::panic::{self, AssertUnwindSafe};
use std::thread;

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::bail;
use crate::error::{ErrorKind, NutriResult};
use crate::nutri_error;

/// Unit of CPU bound work executed on a [`ComputeThread`].
type ComputeTask = Box<dyn FnOnce() + Send + 'static>;

/// Long-lived OS thread executing the CPU bound part of a worker's jobs.
///
/// Each job worker owns one compute thread, created with the worker and reused for every job
/// it runs. The thread stops once its [`ComputeThread`] is dropped.
#[derive(Debug)]
pub struct ComputeThread {
    tasks_tx: mpsc::UnboundedSender<ComputeTask>,
}

impl ComputeThread {
    /// Spawns a compute thread named `name`.
    pub fn spawn(name: String) -> NutriResult<Self> {
        let (tasks_tx, mut tasks_rx) = mpsc::unbounded_channel::<ComputeTask>();

        thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                while let Some(task) = tasks_rx.blocking_recv() {
                    task();
                }
            })
            .map_err(|err| {
                nutri_error!(
                    ErrorKind::IoError,
                    "Failed to spawn a compute thread",
                    &name,
                    source: err
                )
            })?;

        debug!(%name, "spawned compute thread");

        Ok(Self { tasks_tx })
    }

    /// Runs `compute` on the compute thread and returns its output.
    ///
    /// A panic inside `compute` is caught and reported as [`ErrorKind::AggregationPanic`], the
    /// thread keeps serving later calls.
    pub async fn run<F, T>(&self, compute: F) -> NutriResult<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel();
        let task: ComputeTask = Box::new(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(compute));
            // The caller may have been cancelled, in which case nobody waits for the result.
            let _ = result_tx.send(result);
        });

        if self.tasks_tx.send(task).is_err() {
            bail!(ErrorKind::InvalidState, "The compute thread has stopped");
        }

        match result_rx.await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(payload)) => Err(nutri_error!(
                ErrorKind::AggregationPanic,
                "Aggregation panicked",
                panic_message(payload)
            )),
            Err(_) => bail!(ErrorKind::InvalidState, "The compute thread has stopped"),
        }
    }
}

/// Extracts the message of a panic payload, if it carries one.
fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
