use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

use crate::domain::{AuthError, PlanningError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    AlreadyAttached,
    BulkInterrupted,
    InvalidCredentials,
}

/// How far a bulk write got before it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub applied: usize,
    pub total: usize,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    progress: Option<Progress>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: Option<ErrorCode>,
    progress: Option<Progress>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
            progress: None,
        }
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            code: self.code,
            progress: self.progress,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<PlanningError> for ApiError {
    fn from(err: PlanningError) -> Self {
        match err {
            PlanningError::Validation(_) | PlanningError::InvalidRow(_) => Self::bad_request(err.to_string()),
            PlanningError::NotFound { .. } => Self::not_found(err.to_string()),
            PlanningError::AlreadyAttached => Self::conflict(err.to_string()).with_code(ErrorCode::AlreadyAttached),
            PlanningError::Conflict(_) => Self::conflict(err.to_string()),
            PlanningError::BulkInterrupted {
                applied,
                total,
                ref source,
            } => {
                let inner = Self::from_source(source);
                Self {
                    status: inner.status,
                    message: err.to_string(),
                    code: Some(ErrorCode::BulkInterrupted),
                    progress: Some(Progress { applied, total }),
                }
            }
            PlanningError::Backend(ref e) => {
                tracing::error!("Backend error: {}", e);
                Self::bad_gateway(err.to_string())
            }
        }
    }
}

impl ApiError {
    /// Status of the write that interrupted a bulk update.
    fn from_source(source: &PlanningError) -> Self {
        match source {
            PlanningError::Backend(_) | PlanningError::Conflict(_) => Self::bad_gateway(source.to_string()),
            PlanningError::Validation(_) => Self::bad_request(source.to_string()),
            _ => Self::internal(source.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(_) => Self::bad_request(err.to_string()),
            AuthError::InvalidCredentials => {
                Self::unauthorized(err.to_string()).with_code(ErrorCode::InvalidCredentials)
            }
            AuthError::NotAuthenticated => Self::unauthorized(err.to_string()),
            AuthError::Provider(ref e) => {
                tracing::error!("Auth provider error: {}", e);
                Self::bad_gateway(err.to_string())
            }
        }
    }
}
