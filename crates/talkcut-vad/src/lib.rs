//! Speech-segment detection and merging engine.
//!
//! Given a mono PCM buffer and a frame-level speech classifier, this crate
//! produces a minimal, ordered list of `[start, end]` intervals bounding
//! spoken content, ready for transcription and trimming.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   ┌────────────┐   ┌────────────┐   ┌────────────┐
//! │ AudioBuffer │──►│ Framer     │──►│ Classifier │──►│ Aggregator │
//! │ (mono PCM)  │   │ (30 ms)    │   │ (fail-open)│   │ (group +   │
//! └─────────────┘   └────────────┘   └────────────┘   │   merge)   │
//!                                                     └────────────┘
//! ```
//!
//! One synchronous left-to-right pass, no backtracking. The engine is
//! pure: buffer in, segment list out. Audio extraction and everything
//! downstream live in other crates.

pub mod buffer;
pub mod classifier;
pub mod config;
pub mod framer;
pub mod segmenter;

pub use buffer::AudioBuffer;
pub use classifier::{
    classify, Aggressiveness, ClassifierError, SpeechClassifier, SpeechFlag, WebRtcClassifier,
};
pub use config::DetectionConfig;
pub use framer::{frame_size_samples, frames, Frame};
pub use segmenter::{group_raw, merge_close, segment_stats, SegmentStats};

use thiserror::Error;
use tracing::debug;

use talkcut_models::SpeechSegment;

/// Sample rates the frame classifier accepts.
pub const SUPPORTED_SAMPLE_RATES: [u32; 4] = [8000, 16000, 32000, 48000];

/// Result type for detection.
pub type DetectionResult<T> = Result<T, DetectionError>;

/// Caller precondition violations. Nothing else in the engine can fail:
/// per-frame classifier errors are absorbed as non-speech.
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("frame duration must be positive, got {0} ms")]
    InvalidFrameDuration(u32),

    #[error("sample rate {0} Hz is not accepted by the classifier (expected 8000, 16000, 32000, or 48000)")]
    UnsupportedSampleRate(u32),
}

/// Detect speech segments in a buffered audio signal.
///
/// Builds a [`WebRtcClassifier`] for the buffer's sample rate with the
/// configured aggressiveness, then runs framing, per-frame classification,
/// hysteresis grouping, and gap merging in one pass. An all-silent signal
/// (including one whose every frame fails classification) yields an empty
/// list, which is a valid outcome, not an error.
pub fn detect_speech_segments(
    buffer: &AudioBuffer,
    config: &DetectionConfig,
) -> DetectionResult<Vec<SpeechSegment>> {
    validate(buffer, config)?;

    let mut classifier = WebRtcClassifier::new(buffer.sample_rate(), config.aggressiveness)
        .map_err(|_| DetectionError::UnsupportedSampleRate(buffer.sample_rate()))?;

    Ok(run(buffer, config, &mut classifier))
}

/// Detect speech segments with a caller-supplied classifier.
///
/// Same pipeline as [`detect_speech_segments`], for callers that inject
/// their own [`SpeechClassifier`] implementation.
pub fn detect_speech_segments_with<C: SpeechClassifier + ?Sized>(
    buffer: &AudioBuffer,
    config: &DetectionConfig,
    classifier: &mut C,
) -> DetectionResult<Vec<SpeechSegment>> {
    validate(buffer, config)?;
    Ok(run(buffer, config, classifier))
}

fn validate(buffer: &AudioBuffer, config: &DetectionConfig) -> DetectionResult<()> {
    if config.frame_duration_ms == 0 {
        return Err(DetectionError::InvalidFrameDuration(config.frame_duration_ms));
    }
    if !SUPPORTED_SAMPLE_RATES.contains(&buffer.sample_rate()) {
        return Err(DetectionError::UnsupportedSampleRate(buffer.sample_rate()));
    }
    Ok(())
}

fn run<C: SpeechClassifier + ?Sized>(
    buffer: &AudioBuffer,
    config: &DetectionConfig,
    classifier: &mut C,
) -> Vec<SpeechSegment> {
    let flags = classify(
        frames(buffer, config.frame_duration_ms),
        classifier,
        buffer.sample_rate(),
    );
    let raw = group_raw(&flags, config.post_speech_padding_sec, buffer.duration_secs());
    let merged = merge_close(raw, config.merge_gap_sec);

    let stats = segment_stats(&merged, buffer.duration_secs());
    debug!(
        frames = flags.len(),
        segments = stats.segment_count,
        speech_secs = format!("{:.2}", stats.speech_secs),
        speech_ratio = format!("{:.1}%", stats.speech_ratio * 100.0),
        "Speech detection complete"
    );

    merged
}
