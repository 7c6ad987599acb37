//! Error types for kaiwa-spk

use kaiwa_core::Error as CoreError;
use thiserror::Error;

/// Playback errors. Only precondition violations are reported this way;
/// degraded runtime conditions never surface as errors.
#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("Invalid turn {index}: {reason}")]
    InvalidTurn { index: usize, reason: String },

    #[error("Unsupported playback rate: {0}")]
    UnsupportedRate(f32),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<SpeechError> for CoreError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::Config(msg) => CoreError::Configuration(msg),
            other => CoreError::Speech(other.to_string()),
        }
    }
}
