//! Worker configuration.

use std::path::PathBuf;

use talkcut_vad::{Aggressiveness, DetectionConfig};

use crate::error::{WorkerError, WorkerResult};

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Directory scanned for input videos
    pub raw_video_dir: PathBuf,
    /// Directory final videos are written to
    pub edited_video_dir: PathBuf,
    /// OpenAI API key
    pub openai_api_key: String,
    /// Base URL of the OpenAI API (overridable for tests)
    pub openai_base_url: String,
    /// Model used for transcription
    pub whisper_model: String,
    /// Model used for transcript filtering
    pub chat_model: String,
    /// Speech detection tuning
    pub detection: DetectionConfig,
}

impl WorkerConfig {
    /// Create config from environment variables.
    ///
    /// `OPENAI_API_KEY` is required; everything else has a default.
    pub fn from_env() -> WorkerResult<Self> {
        let openai_api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| WorkerError::config_error("OPENAI_API_KEY not set"))?;

        let detection = DetectionConfig::default()
            .with_frame_duration_ms(
                std::env::var("TALKCUT_FRAME_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            )
            .with_post_speech_padding_sec(
                std::env::var("TALKCUT_POST_PADDING_SEC")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0.2),
            )
            .with_merge_gap_sec(
                std::env::var("TALKCUT_MERGE_GAP_SEC")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0.3),
            )
            .with_aggressiveness(
                std::env::var("TALKCUT_VAD_AGGRESSIVENESS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .and_then(Aggressiveness::from_level)
                    .unwrap_or_default(),
            );

        Ok(Self {
            raw_video_dir: std::env::var("TALKCUT_RAW_DIR")
                .unwrap_or_else(|_| "raw".to_string())
                .into(),
            edited_video_dir: std::env::var("TALKCUT_EDITED_DIR")
                .unwrap_or_else(|_| "edited".to_string())
                .into(),
            openai_api_key,
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            whisper_model: std::env::var("TALKCUT_WHISPER_MODEL")
                .unwrap_or_else(|_| "whisper-1".to_string()),
            chat_model: std::env::var("TALKCUT_CHAT_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            detection,
        })
    }
}
