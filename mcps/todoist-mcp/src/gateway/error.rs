//! Error types for Todoist API calls

use thiserror::Error;

/// Errors that can occur when talking to the Todoist API
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The API answered with a non-success status code
    #[error("Todoist API error ({status}): {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The request never produced a response (connect, TLS, timeout)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A success response carried a body that is not JSON
    #[error("failed to parse Todoist response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GatewayError {
    /// Status code for API errors, `None` for transport-level failures
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;
