use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::{calendar::CalendarError, euler::EulerError};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl From<tokio_postgres::Error> for StorageError {
    fn from(err: tokio_postgres::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}

impl From<deadpool_postgres::PoolError> for StorageError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        StorageError::Database(err.to_string())
    }
}

/// Request-scoped failure surfaced by a handler.
///
/// Every variant is logged when it is turned into a response; none of them
/// stop the server.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("could not reach activity storage: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Euler(#[from] EulerError),

    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            AppError::Calendar(CalendarError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        error!(%status, "{self}");

        status.into_response()
    }
}
