use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorReply;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

/// Request-level failures, each mapped to one HTTP status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Key not found")]
    KeyNotFound,
    #[error("Failed to save data")]
    SaveFailed,
    #[error("{0}")]
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Unauthorized => ApiError::Unauthorized,
            // already logged by the service layer
            ServiceError::Persistence(_) | ServiceError::Serialization(_) => ApiError::SaveFailed,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::KeyNotFound => StatusCode::NOT_FOUND,
            ApiError::SaveFailed | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let msg = self.to_string();
        match self {
            // lookups answer in plain text, like the value itself
            ApiError::KeyNotFound => (status, msg).into_response(),
            ApiError::Unauthorized => {
                warn!("rejected request with invalid credential");
                (status, Json(ErrorReply::new(msg))).into_response()
            }
            ApiError::Internal(_) => {
                error!(error = %msg, "internal error");
                (status, Json(ErrorReply::new(msg))).into_response()
            }
            _ => (status, Json(ErrorReply::new(msg))).into_response(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("cannot open store: {0}")]
    Storage(#[from] ServiceError),
    #[error("cannot bind {addr}: {source}")]
    Bind { addr: String, source: std::io::Error },
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
