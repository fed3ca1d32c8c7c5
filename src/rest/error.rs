// rest/error.rs — API error taxonomy.
//
// Store failures are caught at the handler boundary and mapped to a status
// plus a JSON body. The list/update/delete paths surface the underlying
// message verbatim under a `message` key; the create path uses an `error`
// key and never leaks the store error.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// 400 — malformed identifier or bad input. `{message}` body.
    #[error("{0}")]
    Client(String),
    /// 404 — identifier matched no task. `{message}` body.
    #[error("{0}")]
    NotFound(String),
    /// 500 — store failure, message surfaced verbatim. `{message}` body.
    #[error("{0}")]
    Internal(String),
    /// Create-path failure with the given status. `{error}` body.
    #[error("{1}")]
    Create(StatusCode, String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Client(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "message": message }))).into_response()
            }
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": message })),
            )
                .into_response(),
            ApiError::Create(status, error) => {
                (status, Json(json!({ "error": error }))).into_response()
            }
        }
    }
}
