//! Per-request failures at the HTTP boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Request failures reported to the caller as `{"error": "..."}`.
///
/// Signature failures are recorded in the inbox, not returned.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body could not be read (broken stream or over the limit).
    #[error("failed to read body")]
    BodyRead,

    #[error("invalid JSON body")]
    InvalidJson(#[source] serde_json::Error),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BodyRead | ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
