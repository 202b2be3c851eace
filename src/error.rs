use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::db::ClassId;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("class {0} not found")]
    NotFound(ClassId),

    #[error("class {0} is fully booked")]
    CapacityExceeded(ClassId),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::CapacityExceeded(_) => (StatusCode::CONFLICT, "class_full"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::Storage(err) => {
                tracing::error!(error = ?err, "storage unavailable");
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_unavailable")
            }
        };

        let message = match &self {
            // don't leak driver internals to the caller
            AppError::Storage(_) => "the booking store is temporarily unavailable".to_string(),
            other => other.to_string(),
        };

        (status, Json(ErrorBody { error, message })).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
