//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use badger_domain::error::BadgerError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps request and engine failures to HTTP responses.
pub enum ApiError {
    /// The request itself is malformed.
    BadRequest(String),
    /// The engine reported an error.
    Badger(BadgerError),
}

impl From<BadgerError> for ApiError {
    fn from(err: BadgerError) -> Self {
        Self::Badger(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Badger(err @ BadgerError::Config(_)) => (StatusCode::BAD_REQUEST, err.to_string()),
            Self::Badger(err @ BadgerError::Validation(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            Self::Badger(
                err @ (BadgerError::Execution(_) | BadgerError::Database(_) | BadgerError::Api(_)),
            ) => {
                tracing::error!(error = %err, "action failed");
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
