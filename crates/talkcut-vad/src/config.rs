//! Detection configuration.
//!
//! These parameters control frame granularity, trailing padding, and how
//! much silence between two speech runs still merges them into one cut.

use serde::{Deserialize, Serialize};

use crate::classifier::Aggressiveness;

/// Configuration for speech-segment detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Frame granularity in milliseconds.
    ///
    /// The WebRTC classifier accepts 10, 20, or 30 ms frames. Shorter
    /// frames give finer boundaries at more classifier calls per second.
    /// - Default: 30
    pub frame_duration_ms: u32,

    /// Trailing padding in seconds appended when a speech run closes
    /// mid-stream.
    ///
    /// Prevents clipping trailing word endings. A run still open at the
    /// end of the signal is not padded.
    /// - Default: 0.2
    pub post_speech_padding_sec: f64,

    /// Maximum silent gap in seconds that still merges two adjacent raw
    /// segments.
    ///
    /// Measured between the padded end of one segment and the start of
    /// the next; a gap of exactly this value does not merge.
    /// - Default: 0.3
    pub merge_gap_sec: f64,

    /// Classifier aggressiveness, forwarded to the VAD unchanged.
    /// - Default: most aggressive
    pub aggressiveness: Aggressiveness,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            frame_duration_ms: 30,
            post_speech_padding_sec: 0.2,
            merge_gap_sec: 0.3,
            aggressiveness: Aggressiveness::VeryAggressive,
        }
    }
}

impl DetectionConfig {
    /// Builder-style setter for frame duration.
    pub fn with_frame_duration_ms(mut self, ms: u32) -> Self {
        self.frame_duration_ms = ms;
        self
    }

    /// Builder-style setter for post-speech padding.
    pub fn with_post_speech_padding_sec(mut self, secs: f64) -> Self {
        self.post_speech_padding_sec = secs;
        self
    }

    /// Builder-style setter for the merge gap.
    pub fn with_merge_gap_sec(mut self, secs: f64) -> Self {
        self.merge_gap_sec = secs;
        self
    }

    /// Builder-style setter for classifier aggressiveness.
    pub fn with_aggressiveness(mut self, aggressiveness: Aggressiveness) -> Self {
        self.aggressiveness = aggressiveness;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DetectionConfig::default();
        assert_eq!(config.frame_duration_ms, 30);
        assert!((config.post_speech_padding_sec - 0.2).abs() < f64::EPSILON);
        assert!((config.merge_gap_sec - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.aggressiveness, Aggressiveness::VeryAggressive);
    }

    #[test]
    fn test_builder_pattern() {
        let config = DetectionConfig::default()
            .with_frame_duration_ms(10)
            .with_merge_gap_sec(0.5);

        assert_eq!(config.frame_duration_ms, 10);
        assert!((config.merge_gap_sec - 0.5).abs() < f64::EPSILON);
    }
}
