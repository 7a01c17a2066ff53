use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::notification::NotificationError;
use crate::domain::ports::StoreError;
use crate::domain::workflow::WorkflowError;

// ApiSuccess is a wrapper around a response that includes a status code.

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize>(StatusCode, Json<T>);

impl<T: Serialize> ApiSuccess<T> {
    pub(crate) fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

// ApiError is a wrapper around a response that includes a status code.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    Unauthorized(String),
    ConflictWithServerState(String),
    NotFound(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::InternalServerError(e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => Self::NotFound("Resource not found".to_string()),
            StoreError::VersionConflict => {
                Self::ConflictWithServerState("Resource was modified concurrently".to_string())
            }
            StoreError::UniqueViolation(cause) => Self::ConflictWithServerState(cause),
            StoreError::DatabaseError(cause) => {
                tracing::error!("{:?}", cause);
                Self::InternalServerError("Database server error".to_string())
            }
        }
    }
}

impl From<WorkflowError> for ApiError {
    fn from(value: WorkflowError) -> Self {
        match &value {
            WorkflowError::SyllabusNotFound(_) | WorkflowError::UserNotFound(_) => {
                Self::NotFound(value.to_string())
            }
            WorkflowError::Unauthorized(_) => Self::Unauthorized(value.to_string()),
            WorkflowError::InvalidState { .. } => Self::UnprocessableEntity(value.to_string()),
            WorkflowError::ConcurrentModification(_) => {
                Self::ConflictWithServerState(value.to_string())
            }
            WorkflowError::Store(cause) => {
                tracing::error!("{:?}", cause);
                Self::InternalServerError("Database server error".to_string())
            }
        }
    }
}

impl From<NotificationError> for ApiError {
    fn from(value: NotificationError) -> Self {
        match &value {
            NotificationError::UserNotFound(_) | NotificationError::NotFound => {
                Self::NotFound(value.to_string())
            }
            NotificationError::Unauthorized(_) => Self::Unauthorized(value.to_string()),
            NotificationError::Store(cause) => {
                tracing::error!("{:?}", cause);
                Self::InternalServerError("Database server error".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use ApiError::*;

        match self {
            InternalServerError(e) => {
                tracing::error!("{}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponseBody::new_error(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )),
                )
                    .into_response()
            }
            UnprocessableEntity(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponseBody::new_error(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    message,
                )),
            )
                .into_response(),
            Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponseBody::new_error(StatusCode::UNAUTHORIZED, message)),
            )
                .into_response(),
            ConflictWithServerState(message) => (
                StatusCode::CONFLICT,
                Json(ApiResponseBody::new_error(StatusCode::CONFLICT, message)),
            )
                .into_response(),
            NotFound(message) => (
                StatusCode::NOT_FOUND,
                Json(ApiResponseBody::new_error(StatusCode::NOT_FOUND, message)),
            )
                .into_response(),
        }
    }
}

// Generic response structure shared by all API responses.

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    pub status_code: u16,
    pub data: T,
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

/// The response data format for all error responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}
