//! Error types for backend and directory calls.

use serde::Deserialize;
use thiserror::Error;

/// Fallback when the server gives no structured error body.
const GENERIC_API_ERROR: &str = "the server returned an error without details";

/// Client error types
#[derive(Error, Debug)]
pub enum ClientError {
    /// Resource not found (HTTP 404)
    #[error("{0} not found")]
    NotFound(String),

    /// The server rejected the request with a structured or generic error
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure (connect, timeout, TLS, ...)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("Response decoding error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Client-side configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Catch-all for unexpected failures
    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Check if the error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }

    /// Check if the error came from an API rejection rather than transport
    pub fn is_api_error(&self) -> bool {
        matches!(self, ClientError::Api { .. })
    }
}

/// Error body shape used by the backend. Individual deployments populate
/// different subsets of these fields.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub description: Option<String>,
    pub detail: Option<String>,
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// First populated field wins: description, then detail, then message,
    /// then the generic fallback.
    pub fn into_message(self) -> String {
        self.description
            .or(self.detail)
            .or(self.message)
            .unwrap_or_else(|| GENERIC_API_ERROR.to_string())
    }
}

/// Convert a non-success response into a `ClientError`, extracting the
/// structured error body when one is present.
pub(crate) async fn error_from_response(response: reqwest::Response) -> ClientError {
    let status = response.status().as_u16();
    let body = response
        .json::<ApiErrorBody>()
        .await
        .unwrap_or_default();

    ClientError::Api {
        status,
        message: body.into_message(),
    }
}
