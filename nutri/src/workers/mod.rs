//! Workers executing queued jobs.
//!
//! A [`pool::JobWorkerPool`] owns a fixed set of [`job::JobWorker`] tasks created once at
//! startup. Every worker repeatedly takes the next job from the shared queue, runs it and
//! records its outcome, until the shutdown sentinel stops the pool. The CPU bound aggregation
//! of a job runs on the worker's [`compute::ComputeThread`], a dedicated OS thread created with
//! the worker.

pub mod compute;
pub mod job;
pub mod pool;
