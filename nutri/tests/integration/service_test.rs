use std::collections::HashSet;
use std::time::Duration;

use nutri::error::ErrorKind;
use nutri::jobs::{JobId, JobStatus, QueryKind, QueryParams};
use nutri::service::{INVALID_JOB_ID_REASON, JobPoll, JobService};
use nutri::store::both::MemoryStore;
use nutri::store::results::{FilesystemResultStore, ResultStore};
use nutri::test_utils::dataset::{OBESITY_QUESTION, sample_dataset};
use nutri::test_utils::service::wait_for_job;
use nutri_telemetry::tracing::init_test_tracing;
use serde_json::json;

const TIMEOUT: Duration = Duration::from_secs(10);

fn params(state: Option<&str>) -> QueryParams {
    QueryParams {
        question: OBESITY_QUESTION.to_owned(),
        state: state.map(str::to_owned),
    }
}

async fn start_service(pool_size: usize) -> JobService<MemoryStore, MemoryStore> {
    let store = MemoryStore::new();
    JobService::start(sample_dataset(), pool_size, store.clone(), store)
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn submitted_job_is_running_or_done_never_error() {
    init_test_tracing();
    let service = start_service(2).await;

    let job_id = service
        .submit(QueryKind::StateMeanByCategory, params(Some("Utah")))
        .await
        .unwrap();

    let poll = service.poll(job_id).await.unwrap();
    assert!(matches!(poll, JobPoll::Running | JobPoll::Done { .. }));

    let poll = wait_for_job(&service, job_id, TIMEOUT).await;
    assert_eq!(
        poll,
        JobPoll::Done {
            data: json!({"Utah": {
                "('Race/Ethnicity', 'Hispanic')": 38.9,
                "('Race/Ethnicity', 'Other')": 34.5,
            }})
        }
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_get_distinct_consecutive_ids() {
    init_test_tracing();
    let service = start_service(4).await;

    let mut handles = Vec::new();
    for _ in 0..50 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .submit(QueryKind::StatesMean, params(None))
                .await
                .unwrap()
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap().into_inner());
    }
    assert_eq!(ids, (1..=50).collect());

    for id in 1..=50 {
        let poll = wait_for_job(&service, JobId::new(id), TIMEOUT).await;
        assert!(matches!(poll, JobPoll::Done { .. }));
    }
    assert_eq!(service.count_pending().await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn repeated_query_yields_identical_results() {
    init_test_tracing();
    let service = start_service(3).await;

    let first = service
        .submit(QueryKind::DiffFromMean, params(None))
        .await
        .unwrap();
    let second = service
        .submit(QueryKind::DiffFromMean, params(None))
        .await
        .unwrap();

    let first = wait_for_job(&service, first, TIMEOUT).await;
    let second = wait_for_job(&service, second, TIMEOUT).await;

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn invalid_ids_and_parameters_are_reported() {
    init_test_tracing();
    let service = start_service(1).await;

    let invalid = JobPoll::Error {
        reason: INVALID_JOB_ID_REASON.to_owned(),
    };
    assert_eq!(service.poll(JobId::new(0)).await.unwrap(), invalid);
    assert_eq!(service.poll(JobId::new(42)).await.unwrap(), invalid);

    let err = service
        .submit(QueryKind::StateMean, params(None))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidJobParameters);

    // A rejected submission does not consume an id.
    let job_id = service
        .submit(QueryKind::StateMean, params(Some("Utah")))
        .await
        .unwrap();
    assert_eq!(job_id, JobId::new(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shutdown_on_empty_queue_is_done_and_idempotent() {
    init_test_tracing();
    let service = start_service(2).await;

    assert_eq!(service.initiate_shutdown().await.unwrap(), JobStatus::Done);
    tokio::time::timeout(TIMEOUT, service.wait())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(service.initiate_shutdown().await.unwrap(), JobStatus::Done);
    assert_eq!(service.count_pending().await.unwrap(), 0);
    assert!(service.list_jobs().await.unwrap().is_empty());

    let err = service
        .submit(QueryKind::GlobalMean, params(None))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShuttingDown);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shutdown_repeated_while_draining_leaves_nothing_pending() {
    init_test_tracing();
    let service = start_service(2).await;

    for _ in 0..5 {
        service
            .submit(QueryKind::StatesMean, params(None))
            .await
            .unwrap();
    }

    service.initiate_shutdown().await.unwrap();
    service.initiate_shutdown().await.unwrap();
    tokio::time::timeout(TIMEOUT, service.wait())
        .await
        .unwrap()
        .unwrap();

    let jobs = service.list_jobs().await.unwrap();
    assert_eq!(jobs.len(), 5);
    assert!(jobs.iter().all(|(job_id, _)| !job_id.is_sentinel()));
    assert_eq!(service.count_pending().await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn jobs_admitted_before_shutdown_are_completed() {
    init_test_tracing();
    let service = start_service(2).await;

    let mut job_ids = Vec::new();
    for _ in 0..20 {
        job_ids.push(
            service
                .submit(QueryKind::MeanByCategory, params(None))
                .await
                .unwrap(),
        );
    }

    service.initiate_shutdown().await.unwrap();
    tokio::time::timeout(TIMEOUT, service.wait())
        .await
        .unwrap()
        .unwrap();

    for job_id in job_ids {
        assert!(matches!(
            service.poll(job_id).await.unwrap(),
            JobPoll::Done { .. }
        ));
    }

    let jobs = service.list_jobs().await.unwrap();
    assert_eq!(jobs.len(), 20);
    assert!(jobs.iter().all(|(_, status)| *status == JobStatus::Done));
    assert_eq!(service.count_pending().await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn results_are_written_to_the_results_directory() {
    init_test_tracing();
    let dir = tempfile::tempdir().unwrap();
    let result_store = FilesystemResultStore::open(dir.path().join("results"))
        .await
        .unwrap();
    let service = JobService::start(sample_dataset(), 2, MemoryStore::new(), result_store.clone())
        .await
        .unwrap();

    let job_id = service
        .submit(QueryKind::GlobalMean, params(None))
        .await
        .unwrap();

    let poll = wait_for_job(&service, job_id, TIMEOUT).await;

    let JobPoll::Done { data } = poll else {
        panic!("job should be done, got {poll:?}");
    };
    assert_eq!(result_store.get_job_result(job_id).await.unwrap(), Some(data));
    assert!(dir.path().join("results").join("1").exists());
}
