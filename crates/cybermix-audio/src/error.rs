//! Audio backend error types.

use cybermix_core::VolumeError;
use thiserror::Error;

/// Audio backend error type.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("pactl not available: {0}")]
    Unavailable(#[source] std::io::Error),

    #[error("pactl {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Failed to parse pactl output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No audio session matches {0}")]
    SessionNotFound(String),
}

impl From<AudioError> for VolumeError {
    fn from(err: AudioError) -> Self {
        match err {
            AudioError::Unavailable(_) => Self::BackendUnavailable(err.to_string()),
            AudioError::SessionNotFound(name) => Self::SessionNotFound(name),
            AudioError::CommandFailed { .. } | AudioError::Parse(_) => {
                Self::Command(err.to_string())
            }
        }
    }
}

/// Result type for audio operations.
pub type AudioResult<T> = Result<T, AudioError>;
