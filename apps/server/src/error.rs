use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use vehiclemanager_core::envelope::ApiResponse;
use vehiclemanager_core::errors::ErrorKind;

#[derive(Error, Debug)]
pub enum ApiError {
    /// A coordinator operation failed; `status` is the coordinator's
    /// status message.
    #[error("{status}")]
    Failed { kind: ErrorKind, status: String },
    #[error("{0}")]
    BadRequest(String),
    #[error("Resource not found")]
    NotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Request timed out")]
    Timeout,
    #[error("An error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Failed { kind, .. } => match kind {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Connectivity | ErrorKind::Protocol => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Timeout | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::Failed { kind, status } => {
                let message = match kind {
                    ErrorKind::Validation => "Invalid vehicle data",
                    ErrorKind::NotFound => "Vehicle not found",
                    ErrorKind::Connectivity => "Data source unavailable",
                    ErrorKind::Protocol => "Data source returned an invalid response",
                };
                ApiResponse::<()>::error(message).with_details(status.clone())
            }
            ApiError::BadRequest(reason) => ApiResponse::error(reason.clone()),
            ApiError::NotFound
            | ApiError::MethodNotAllowed
            | ApiError::Timeout
            | ApiError::Internal(_) => ApiResponse::error(self.to_string()),
        };
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
