//! Structured API error responses.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use bleeparr_core::library::FilterStoreError;
use bleeparr_core::{AdminError, EnqueueRejection, SettingsError, SubmitError};

/// Error body: `{success: false, error, reason}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub reason: &'static str,
}

/// Error returned by every handler.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub reason: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, reason: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            reason,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }

    /// A settings body that does not deserialize.
    pub fn invalid_settings(rejection: JsonRejection) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "invalid_settings",
            rejection.body_text(),
        )
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                success: false,
                error: self.message,
                reason: self.reason,
            }),
        )
            .into_response()
    }
}

fn rejection_status(rejection: &EnqueueRejection) -> StatusCode {
    match rejection {
        EnqueueRejection::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
        EnqueueRejection::NotEligible { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        EnqueueRejection::Duplicate { .. } => StatusCode::CONFLICT,
        EnqueueRejection::QueueFull { .. } => StatusCode::TOO_MANY_REQUESTS,
        EnqueueRejection::EligibilityUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<SubmitError> for ApiError {
    fn from(err: SubmitError) -> Self {
        let status = match &err {
            SubmitError::Rejected(rejection) => rejection_status(rejection),
            SubmitError::NoFile(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SubmitError::NotFound(_) => StatusCode::NOT_FOUND,
            SubmitError::LibraryUnavailable { .. } => StatusCode::BAD_GATEWAY,
            SubmitError::FilterStore(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.reason_code(), err.to_string())
    }
}

impl From<SettingsError> for ApiError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::Invalid(_) => {
                Self::new(StatusCode::BAD_REQUEST, "invalid_settings", err.to_string())
            }
            SettingsError::Store(_) => Self::internal(err.to_string()),
        }
    }
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        let status = match err {
            AdminError::InvalidConfirmation(_) => StatusCode::BAD_REQUEST,
            AdminError::RebootInProgress => StatusCode::CONFLICT,
        };
        Self::new(status, err.reason_code(), err.to_string())
    }
}

impl From<FilterStoreError> for ApiError {
    fn from(err: FilterStoreError) -> Self {
        match err {
            FilterStoreError::IdOutOfRange(_) => Self::bad_request(err.to_string()),
            other => Self::internal(other.to_string()),
        }
    }
}
