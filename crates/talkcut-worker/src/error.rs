//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Transcript filtering failed: {0}")]
    FilteringFailed(String),

    #[error("Detection error: {0}")]
    Detection(#[from] talkcut_vad::DetectionError),

    #[error("Media error: {0}")]
    Media(#[from] talkcut_media::MediaError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn transcription_failed(msg: impl Into<String>) -> Self {
        Self::TranscriptionFailed(msg.into())
    }

    pub fn filtering_failed(msg: impl Into<String>) -> Self {
        Self::FilteringFailed(msg.into())
    }
}
