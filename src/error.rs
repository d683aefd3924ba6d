use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unauthorized")]
    MissingSession,

    #[error("User not found for session")]
    UnknownSession,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(e.into())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::MissingSession => StatusCode::UNAUTHORIZED,
            AppError::UnknownSession => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Validation(v) => ErrorBody {
                error: "validation failed".into(),
                field: Some(v.field.as_str()),
                message: Some(v.message.as_str()),
            },
            AppError::Internal(e) => {
                error!(error = %format!("{:#}", e), "internal error");
                ErrorBody {
                    error: "Internal server error".into(),
                    field: None,
                    message: None,
                }
            }
            other => ErrorBody {
                error: other.to_string(),
                field: None,
                message: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
