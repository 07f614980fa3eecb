use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};

pub mod health_check;
pub mod index;
pub mod jobs;
pub mod metrics;
pub mod queries;

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub error: String,
}

/// Body of the responses reporting a status and, optionally, data.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse<T> {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> StatusResponse<T> {
    pub fn done(data: T) -> Self {
        Self {
            status: "done".to_owned(),
            data: Some(data),
        }
    }
}

/// Builds a JSON error response with the given status code.
pub(crate) fn error_response(status_code: StatusCode, error: String) -> HttpResponse {
    let error_message = ErrorMessage { error };

    HttpResponse::build(status_code).json(error_message)
}
