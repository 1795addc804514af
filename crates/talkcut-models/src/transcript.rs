//! Transcribed speech segments.

use serde::{Deserialize, Serialize};

use crate::segment::SpeechSegment;

/// A speech segment together with its transcribed text.
///
/// Produced by the transcription step, filtered by the LLM pass, and
/// consumed by video assembly (which only reads the interval).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start of the interval in seconds.
    pub start: f64,
    /// End of the interval in seconds.
    pub end: f64,
    /// Transcribed text, whitespace-trimmed.
    pub text: String,
}

impl TranscriptSegment {
    /// Attach text to a detected segment.
    pub fn new(segment: SpeechSegment, text: impl Into<String>) -> Self {
        Self {
            start: segment.start,
            end: segment.end,
            text: text.into(),
        }
    }

    /// The interval of this transcript entry.
    pub fn segment(&self) -> SpeechSegment {
        SpeechSegment::new(self.start, self.end)
    }
}
