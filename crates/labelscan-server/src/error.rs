//! Mapping of service outcomes to HTTP responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use labelscan_core::ServiceError;

/// Error returned by the API handlers.
#[derive(Debug)]
pub enum ApiError {
    /// A failed scan or save.
    Service(ServiceError),

    /// The request body was refused before reaching the service. The
    /// extractor's status is kept (400, 413 or 415).
    Rejected { status: StatusCode, message: String },
}

/// JSON body of an error response. `error` is only set for server errors.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
}

impl ApiError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Service(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Service(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Rejected { status, .. } => *status,
        }
    }

    fn body(&self) -> ErrorBody<'_> {
        match self {
            ApiError::Service(err) => ErrorBody {
                message: err.message(),
                error: err.detail(),
            },
            ApiError::Rejected { message, .. } => ErrorBody {
                message,
                error: None,
            },
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}
