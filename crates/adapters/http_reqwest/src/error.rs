//! Errors raised by the remote API client.

use badger_domain::error::BadgerError;

/// Errors originating from the remote API adapter.
#[derive(Debug, thiserror::Error)]
pub enum HttpClientError {
    /// Building the client or sending the request failed.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Only `GET`, `POST`, `PATCH` and `DELETE` are supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// The API answered with a non-success status.
    #[error("unexpected status {status}: {preview}")]
    UnexpectedStatus { status: u16, preview: String },
}

impl From<HttpClientError> for BadgerError {
    fn from(err: HttpClientError) -> Self {
        Self::Api(Box::new(err))
    }
}
