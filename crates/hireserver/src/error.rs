use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use hirecore::{FlowError, WorkflowError};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Not implemented")]
    NotImplemented { detail: serde_json::Value },

    #[error("{0}")]
    Internal(String),
}

impl From<FlowError> for ApiError {
    fn from(err: FlowError) -> Self {
        match &err {
            FlowError::Workflow(WorkflowError::NotFound(_)) => ApiError::NotFound(err.to_string()),
            e if e.is_definition_error() => ApiError::Unprocessable(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotImplemented { .. } => StatusCode::NOT_IMPLEMENTED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::NotImplemented { detail } => json!({
                "error": self.to_string(),
                "detail": detail,
            }),
            _ => json!({ "error": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
