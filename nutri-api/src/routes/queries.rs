use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, ResponseError, post, web::Data, web::Json, web::Path};
use nutri::error::{ErrorKind, NutriError};
use nutri::jobs::{JobId, QueryKind, QueryParams};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::routes::error_response;
use crate::startup::ApiJobService;

/// Reason reported to clients submitting while the service shuts down.
pub const SHUTTING_DOWN_REASON: &str = "shutting down";

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("The query kind `{0}` is not supported")]
    UnknownQueryKind(String),

    #[error("Invalid query parameters: {0}")]
    InvalidParameters(String),

    #[error("internal server error")]
    Internal(#[source] NutriError),
}

impl ResponseError for QueryError {
    fn status_code(&self) -> StatusCode {
        match self {
            QueryError::UnknownQueryKind(_) => StatusCode::NOT_FOUND,
            QueryError::InvalidParameters(_) => StatusCode::BAD_REQUEST,
            QueryError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let QueryError::Internal(err) = self {
            error!(error = %err, "query submission failed");
        }

        error_response(self.status_code(), self.to_string())
    }
}

/// Body of a query submission.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitQueryRequest {
    pub question: String,
    #[serde(default)]
    pub state: Option<String>,
}

/// Response to a query submission.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmitQueryResponse {
    Accepted { job_id: JobId },
    Rejected { status: String, reason: String },
}

/// Queues a query of `kind` and returns the id of its job.
#[post("/api/{kind}")]
pub async fn submit_query(
    service: Data<ApiJobService>,
    kind: Path<String>,
    request: Json<SubmitQueryRequest>,
) -> Result<impl Responder, QueryError> {
    let kind = kind.into_inner();
    let query_kind = kind
        .parse::<QueryKind>()
        .map_err(|_| QueryError::UnknownQueryKind(kind))?;

    let request = request.into_inner();
    let params = QueryParams {
        question: request.question,
        state: request.state,
    };

    let response = match service.submit(query_kind, params).await {
        Ok(job_id) => {
            info!(%job_id, %query_kind, "query submitted");
            SubmitQueryResponse::Accepted { job_id }
        }
        Err(err) => match err.kind() {
            ErrorKind::ShuttingDown => SubmitQueryResponse::Rejected {
                status: "error".to_owned(),
                reason: SHUTTING_DOWN_REASON.to_owned(),
            },
            ErrorKind::InvalidJobParameters => {
                return Err(QueryError::InvalidParameters(err.summary()));
            }
            _ => return Err(QueryError::Internal(err)),
        },
    };

    Ok(Json(response))
}
