//! Speech segment intervals.

use serde::{Deserialize, Serialize};

/// A speech interval on the audio timeline, in seconds.
///
/// Detection emits segments in non-decreasing `start` order, mutually
/// non-overlapping, with `end >= start`. The same shape is used for raw
/// (pre-merge) and merged segments, and is what the JSON artifacts store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeechSegment {
    /// Start of the interval in seconds.
    pub start: f64,
    /// End of the interval in seconds.
    pub end: f64,
}

impl SpeechSegment {
    /// Create a new segment.
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Duration of this segment in seconds.
    pub fn duration_secs(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Silent gap between the end of this segment and the start of `next`.
    ///
    /// Negative when the two overlap.
    pub fn gap_to(&self, next: &SpeechSegment) -> f64 {
        next.start - self.end
    }
}
