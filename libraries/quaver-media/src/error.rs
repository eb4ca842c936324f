//! Error types for media element control

use thiserror::Error;

/// Errors a media element can report when asked to start playback
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    /// Playback was blocked pending a user gesture
    #[error("Playback not allowed without a user gesture")]
    NotAllowed,

    /// Network failure while fetching the stream
    #[error("Network error: {0}")]
    Network(String),

    /// The stream could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// The load was aborted before playback could start
    #[error("Media load aborted")]
    Aborted,
}

/// Result type for media element operations
pub type Result<T> = std::result::Result<T, MediaError>;
