use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::repository::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Todo not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    /// A field value that cannot be read as the field's type.
    #[error("Cast to {expected} failed for value {value} at path \"{path}\"")]
    Cast {
        path: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("{}", .0.body_text())]
    Body(#[from] JsonRejection),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::Body(_) => StatusCode::BAD_REQUEST,
            AppError::Cast { .. } => {
                tracing::error!(error = %self, "cast failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Store(err) => {
                // the request span carries method and uri
                tracing::error!(error = %err, "store failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
