#![allow(dead_code)]

use std::net::TcpListener;

use nutri::service::JobService;
use nutri::store::both::MemoryStore;
use nutri::store::results::FilesystemResultStore;
use nutri::test_utils::dataset::sample_dataset;
use nutri_api::startup::{ApiJobService, run};
use reqwest::Response;
use serde_json::{Value, json};
use tempfile::TempDir;

pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub service: ApiJobService,
    _results_dir: TempDir,
}

impl TestApp {
    pub async fn submit(&self, kind: &str, body: &Value) -> Response {
        self.api_client
            .post(format!("{}/api/{kind}", &self.address))
            .json(body)
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn get(&self, path: &str) -> Response {
        self.api_client
            .get(format!("{}{path}", &self.address))
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn get_json(&self, path: &str) -> Value {
        self.get(path)
            .await
            .json()
            .await
            .expect("response body is not json")
    }

    /// Polls the results of `job_id` until it is no longer running.
    pub async fn wait_for_results(&self, job_id: u64) -> Value {
        for _ in 0..1000 {
            let body = self.get_json(&format!("/api/get_results/{job_id}")).await;
            if body["status"] != json!("running") {
                return body;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        panic!("job {job_id} did not finish in time");
    }
}

pub async fn spawn_test_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let results_dir = tempfile::tempdir().expect("failed to create results directory");
    let result_store = FilesystemResultStore::open(results_dir.path())
        .await
        .expect("failed to open result store");
    let service = JobService::start(sample_dataset(), 2, MemoryStore::new(), result_store)
        .await
        .expect("failed to start job service");

    let server = run(listener, service.clone()).expect("failed to bind address");
    tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{port}"),
        api_client: reqwest::Client::new(),
        service,
        _results_dir: results_dir,
    }
}
