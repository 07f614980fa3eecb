//! Metrics definitions for job service monitoring.

use std::sync::Once;

use metrics::{Unit, describe_counter, describe_gauge, describe_histogram};

/// Label for the query kind in metrics.
pub const QUERY_KIND_LABEL: &str = "query_kind";

/// Label for error kind in metrics.
pub const ERROR_KIND_LABEL: &str = "error_kind";

/// Counter for jobs accepted by the service.
pub const NUTRI_JOBS_SUBMITTED_TOTAL: &str = "nutri_jobs_submitted_total";

/// Counter for submissions rejected because the service is shutting down.
pub const NUTRI_JOBS_REJECTED_TOTAL: &str = "nutri_jobs_rejected_total";

/// Counter for jobs whose result was persisted.
pub const NUTRI_JOBS_COMPLETED_TOTAL: &str = "nutri_jobs_completed_total";

/// Counter for jobs marked as failed.
pub const NUTRI_JOBS_FAILED_TOTAL: &str = "nutri_jobs_failed_total";

/// Histogram of the time a worker spent on a job, persistence included.
pub const NUTRI_JOB_DURATION_SECONDS: &str = "nutri_job_duration_seconds";

/// Gauge of the number of jobs waiting in the queue.
pub const NUTRI_JOB_QUEUE_DEPTH: &str = "nutri_job_queue_depth";

static REGISTER_METRICS: Once = Once::new();

/// Registers metric descriptions with the global metrics recorder.
///
/// Safe to call multiple times, descriptions are only registered once.
pub fn register_metrics() {
    REGISTER_METRICS.call_once(|| {
        describe_counter!(
            NUTRI_JOBS_SUBMITTED_TOTAL,
            Unit::Count,
            "Total number of jobs accepted by the service"
        );
        describe_counter!(
            NUTRI_JOBS_REJECTED_TOTAL,
            Unit::Count,
            "Total number of submissions rejected during shutdown"
        );
        describe_counter!(
            NUTRI_JOBS_COMPLETED_TOTAL,
            Unit::Count,
            "Total number of jobs completed with a persisted result"
        );
        describe_counter!(
            NUTRI_JOBS_FAILED_TOTAL,
            Unit::Count,
            "Total number of jobs that failed"
        );
        describe_histogram!(
            NUTRI_JOB_DURATION_SECONDS,
            Unit::Seconds,
            "Time spent by a worker executing and persisting a job"
        );
        describe_gauge!(
            NUTRI_JOB_QUEUE_DEPTH,
            Unit::Count,
            "Number of jobs waiting in the queue"
        );
    });
}
