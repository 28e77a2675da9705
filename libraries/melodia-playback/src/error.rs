//! Error types for playback management

use thiserror::Error;

/// Playback errors
///
/// Controller commands never return these; they surface from configuration
/// handling and value parsing at the crate boundary.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Unknown repeat mode name
    #[error("Invalid repeat mode: {0}")]
    InvalidRepeatMode(String),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Classification of a media failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaErrorKind {
    /// Play attempt interrupted by a newer load or a pause
    Aborted,

    /// Resource could not be fetched
    Network,

    /// Resource fetched but could not be decoded
    Decode,

    /// Format or source not supported by the backend
    NotSupported,

    /// Playback refused by the platform (autoplay policy)
    NotAllowed,

    /// Load did not become ready within the configured timeout
    TimedOut,

    /// Anything else reported by the backend
    Other,
}

/// Failure reported by a media handle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?}: {message}")]
pub struct MediaError {
    /// Failure class
    pub kind: MediaErrorKind,

    /// Backend-provided description
    pub message: String,
}

impl MediaError {
    /// Create a new media error
    pub fn new(kind: MediaErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Play attempt superseded by a newer command
    pub fn aborted() -> Self {
        Self::new(
            MediaErrorKind::Aborted,
            "The play() request was interrupted by a new load request",
        )
    }

    /// Classify a browser `DOMException` name
    ///
    /// `AbortError` is the cancellation signal; everything else is a transport failure.
    pub fn from_dom_name(name: &str, message: impl Into<String>) -> Self {
        let kind = match name {
            "AbortError" => MediaErrorKind::Aborted,
            "NetworkError" => MediaErrorKind::Network,
            "EncodingError" => MediaErrorKind::Decode,
            "NotSupportedError" => MediaErrorKind::NotSupported,
            "NotAllowedError" => MediaErrorKind::NotAllowed,
            _ => MediaErrorKind::Other,
        };
        Self::new(kind, message)
    }

    /// Benign cancellation that must never be surfaced
    pub fn is_cancellation(&self) -> bool {
        self.kind == MediaErrorKind::Aborted
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
