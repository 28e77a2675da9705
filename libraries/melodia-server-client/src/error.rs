//! Error types for the Melodia API client.

use thiserror::Error;

/// Errors that can occur when talking to the Melodia API.
#[derive(Error, Debug)]
pub enum ServerClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Token missing, expired or rejected
    #[error("Authentication required")]
    AuthRequired,

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),
}

/// Result type for server client operations.
pub type Result<T> = std::result::Result<T, ServerClientError>;
