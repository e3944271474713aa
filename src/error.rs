use std::path::PathBuf;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("models not loaded")]
    ModelsUnavailable,
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Rejected(#[from] JsonRejection),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::ModelsUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::InvalidInput(_) | ServiceError::Rejected(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            ServiceError::Rejected(rejection) => rejection.body_text(),
            other => other.to_string(),
        };

        let body = serde_json::json!({
            "detail": detail,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Failures while reading or validating a model artifact at startup.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("model artifact missing: {}", .0.display())]
    Missing(PathBuf),
    #[error("io error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid artifact {}: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },
}

/// Raised by a classifier when a row cannot be evaluated.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("column '{column}' expects a {expected} value")]
    ColumnType {
        column: &'static str,
        expected: &'static str,
    },
    #[error("model produced no prediction: {0}")]
    Empty(String),
}

impl From<InferenceError> for ServiceError {
    fn from(err: InferenceError) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}
