use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::db::store::StoreError;
use crate::models::ErrorResponse;

/// Failures surfaced by the room engine, both over REST and over the socket.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollabError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Validation(String),

    #[error("Storage failure: {0}")]
    Store(String),
}

impl CollabError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CollabError::NotFound(_) => StatusCode::NOT_FOUND,
            CollabError::Forbidden(_) => StatusCode::FORBIDDEN,
            CollabError::InvalidState(_) => StatusCode::CONFLICT,
            CollabError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            CollabError::Validation(_) => StatusCode::BAD_REQUEST,
            CollabError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine readable code, used in socket `error` frames.
    pub fn kind(&self) -> &'static str {
        match self {
            CollabError::NotFound(_) => "not_found",
            CollabError::Forbidden(_) => "forbidden",
            CollabError::InvalidState(_) => "invalid_state",
            CollabError::Unauthorized(_) => "unauthorized",
            CollabError::Validation(_) => "validation_error",
            CollabError::Store(_) => "store_error",
        }
    }
}

impl From<StoreError> for CollabError {
    fn from(e: StoreError) -> Self {
        CollabError::Store(e.to_string())
    }
}

impl IntoResponse for CollabError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (
            status,
            Json(ErrorResponse {
                success: false,
                code: status.as_u16(),
                status: status.to_string(),
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

pub type CollabResult<T> = Result<T, CollabError>;
