//! Typed errors and the uniform HTTP error body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Wire shape for every error leaving the service, including the entry
/// point's catch-all 500.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    /// Canonical reason for the status ("Internal Server Error", "Not Found").
    pub message: String,
    /// Specific failure text.
    pub error: String,
}

impl ErrorBody {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            message: status.canonical_reason().unwrap_or("Error").to_string(),
            error: error.into(),
        }
    }

    pub fn internal(error: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }
}

/// Failures during the one-time initialization sequence. Any of these aborts
/// the whole sequence; nothing is cached.
#[derive(Error, Debug)]
pub enum InitError {
    #[error("invalid CORS origin: {0}")]
    InvalidCorsOrigin(String),
    #[error("CORS credentials cannot be combined with a wildcard origin")]
    CorsCredentialsWithWildcard,
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

/// Request-time errors. `IntoResponse` is the global error-translation
/// filter: every variant maps to the uniform [`ErrorBody`].
#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

/// Failures crossing the entry-point boundary. Converted to the fixed 500
/// body there; never propagated to the host.
#[derive(Error, Debug)]
pub enum EntryError {
    #[error(transparent)]
    Init(#[from] InitError),
    #[error("dispatch: {0}")]
    Dispatch(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Db(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorBody::new(status, self.to_string()))).into_response()
    }
}
