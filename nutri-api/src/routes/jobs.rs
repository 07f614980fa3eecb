use std::collections::BTreeMap;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, ResponseError, get, web::Data, web::Json, web::Path};
use nutri::error::NutriError;
use nutri::jobs::JobId;
use nutri::service::{INVALID_JOB_ID_REASON, JobPoll};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::routes::{StatusResponse, error_response};
use crate::startup::ApiJobService;

#[derive(Debug, Error)]
pub enum JobsError {
    #[error("internal server error")]
    Service(#[from] NutriError),
}

impl ResponseError for JobsError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        let JobsError::Service(err) = self;
        error!(error = %err, "job service request failed");

        error_response(self.status_code(), self.to_string())
    }
}

/// Response to a graceful shutdown request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShutdownResponse {
    pub status: String,
}

/// Returns the status of a job and, once it is done, its result.
#[get("/api/get_results/{job_id}")]
pub async fn get_results(
    service: Data<ApiJobService>,
    job_id: Path<String>,
) -> Result<impl Responder, JobsError> {
    // Anything that is not a job id is reported like an id that was never issued.
    let poll = match job_id.parse::<JobId>() {
        Ok(job_id) => service.poll(job_id).await?,
        Err(_) => JobPoll::Error {
            reason: INVALID_JOB_ID_REASON.to_owned(),
        },
    };

    Ok(Json(poll))
}

/// Lists every known job with its status.
#[get("/api/jobs")]
pub async fn list_jobs(service: Data<ApiJobService>) -> Result<impl Responder, JobsError> {
    let jobs: Vec<BTreeMap<String, String>> = service
        .list_jobs()
        .await?
        .into_iter()
        .map(|(job_id, status)| BTreeMap::from([(job_id.to_string(), status.to_string())]))
        .collect();

    Ok(Json(StatusResponse::done(jobs)))
}

/// Returns the number of jobs that did not finish yet.
#[get("/api/num_jobs")]
pub async fn num_jobs(service: Data<ApiJobService>) -> Result<impl Responder, JobsError> {
    let pending = service.count_pending().await?;

    Ok(Json(StatusResponse::done(pending)))
}

/// Stops accepting queries and lets the workers drain the queue.
#[get("/api/graceful_shutdown")]
pub async fn graceful_shutdown(service: Data<ApiJobService>) -> Result<impl Responder, JobsError> {
    let status = service.initiate_shutdown().await?;

    info!(%status, "graceful shutdown requested");

    Ok(Json(ShutdownResponse {
        status: status.to_string(),
    }))
}
