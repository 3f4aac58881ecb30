use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Per-field validation message, serialized as `{"msg": ..., "param": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub msg: &'static str,
    pub param: &'static str,
}

impl FieldError {
    pub fn new(param: &'static str, msg: &'static str) -> Self {
        Self { msg, param }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Store(#[from] redis::RedisError),

    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            AppError::BadRequest(msg) => message(StatusCode::BAD_REQUEST, &msg),
            AppError::Unauthorized(msg) => message(StatusCode::UNAUTHORIZED, &msg),
            AppError::NotFound(msg) => message(StatusCode::NOT_FOUND, &msg),
            AppError::Store(cause) => internal(&cause.to_string()),
            AppError::Codec(cause) => internal(&cause.to_string()),
            AppError::Internal(cause) => internal(&cause),
        }
    }
}

fn message(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "msg": msg }))).into_response()
}

// The cause stays in the logs, callers only see the generic body.
fn internal(cause: &str) -> Response {
    error!("internal failure: {cause}");
    message(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error!")
}
