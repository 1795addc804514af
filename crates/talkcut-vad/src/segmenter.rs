//! Two-phase aggregation of frame verdicts into speech segments.
//!
//! Phase A walks the flag sequence with a two-state hysteresis machine and
//! produces raw padded segments. Phase B merges raw segments separated by
//! less than the configured gap in a single left-to-right pass.
//!
//! # State machine (phase A)
//!
//! ```text
//!                  flag.is_speech
//!     ┌────────────────────────────────────┐
//!     │                                    │
//!     ▼                                    │
//! ┌─────────┐                          ┌───────┐
//! │InSpeech │──────────────────────────│ Idle  │
//! └─────────┘      !flag.is_speech     └───────┘
//!     │            (emit padded segment)
//!     └─ end of stream: emit up to the signal end, unpadded
//! ```

use talkcut_models::SpeechSegment;

use crate::classifier::SpeechFlag;

/// Hysteresis state while walking the flag sequence.
enum State {
    /// No open segment.
    Idle,
    /// A segment is open; tracks where it started and the last frame that
    /// actually contained speech.
    InSpeech { start: f64, last_speech: f64 },
}

/// Group consecutive speech frames into raw segments.
///
/// A segment closed by a non-speech frame ends at the last speech
/// timestamp plus `post_speech_padding_sec`. A segment still open when the
/// flags run out ends at `total_duration_secs` with no padding: there is
/// no trailing silence left to pad into. A single isolated speech frame
/// still produces a one-frame segment.
pub fn group_raw(
    flags: &[SpeechFlag],
    post_speech_padding_sec: f64,
    total_duration_secs: f64,
) -> Vec<SpeechSegment> {
    let mut segments = Vec::new();
    let mut state = State::Idle;

    for flag in flags {
        state = match (state, flag.is_speech) {
            (State::Idle, true) => State::InSpeech {
                start: flag.timestamp,
                last_speech: flag.timestamp,
            },
            (State::InSpeech { start, .. }, true) => State::InSpeech {
                start,
                last_speech: flag.timestamp,
            },
            (State::InSpeech { start, last_speech }, false) => {
                segments.push(SpeechSegment::new(start, last_speech + post_speech_padding_sec));
                State::Idle
            }
            (State::Idle, false) => State::Idle,
        };
    }

    // Force-close at end of stream, unpadded.
    if let State::InSpeech { start, .. } = state {
        segments.push(SpeechSegment::new(start, total_duration_secs));
    }

    segments
}

/// Merge raw segments separated by less than `merge_gap_sec` of silence.
///
/// Greedy single pass with one running accumulator; the input is already
/// ordered and non-overlapping, so one pass produces the final list. The
/// gap is measured from the padded end of the accumulator to the unpadded
/// start of the next segment, and a gap of exactly `merge_gap_sec` does
/// not merge.
pub fn merge_close(raw: Vec<SpeechSegment>, merge_gap_sec: f64) -> Vec<SpeechSegment> {
    let mut raw = raw.into_iter();
    let Some(mut current) = raw.next() else {
        return Vec::new();
    };

    let mut merged = Vec::new();
    for seg in raw {
        if seg.start - current.end < merge_gap_sec {
            current.end = seg.end;
        } else {
            merged.push(current);
            current = seg;
        }
    }
    merged.push(current);

    merged
}

/// Aggregate statistics over a detection result.
#[derive(Debug, Clone)]
pub struct SegmentStats {
    /// Total speech time across all segments, in seconds.
    pub speech_secs: f64,
    /// Number of segments.
    pub segment_count: usize,
    /// Fraction of the signal covered by speech (0.0 to 1.0).
    pub speech_ratio: f64,
}

/// Compute summary statistics for a segment list.
pub fn segment_stats(segments: &[SpeechSegment], total_duration_secs: f64) -> SegmentStats {
    let speech_secs: f64 = segments.iter().map(|s| s.duration_secs()).sum();
    let speech_ratio = if total_duration_secs > 0.0 {
        (speech_secs / total_duration_secs).min(1.0)
    } else {
        0.0
    };

    SegmentStats {
        speech_secs,
        segment_count: segments.len(),
        speech_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(pattern: &[(f64, bool)]) -> Vec<SpeechFlag> {
        pattern
            .iter()
            .map(|&(timestamp, is_speech)| SpeechFlag { timestamp, is_speech })
            .collect()
    }

    #[test]
    fn test_padded_close_mid_stream() {
        // Speech at 0.03 and 0.06, closed by silence at 0.09.
        let input = flags(&[(0.0, false), (0.03, true), (0.06, true), (0.09, false)]);
        let segments = group_raw(&input, 0.2, 0.12);

        assert_eq!(segments.len(), 1);
        assert!((segments[0].start - 0.03).abs() < 1e-9);
        assert!((segments[0].end - 0.26).abs() < 1e-9);
    }

    #[test]
    fn test_unpadded_close_at_end_of_stream() {
        // Still speaking when the flags run out: end at the signal end, no padding.
        let input = flags(&[(0.0, false), (0.03, true), (0.06, true)]);
        let segments = group_raw(&input, 0.2, 0.09);

        assert_eq!(segments.len(), 1);
        assert!((segments[0].end - 0.09).abs() < 1e-9);
    }

    #[test]
    fn test_isolated_speech_frame() {
        let input = flags(&[(0.0, false), (0.03, true), (0.06, false)]);
        let segments = group_raw(&input, 0.2, 0.09);

        assert_eq!(segments.len(), 1);
        assert!((segments[0].start - 0.03).abs() < 1e-9);
        assert!((segments[0].end - 0.23).abs() < 1e-9);
    }

    #[test]
    fn test_all_silence_yields_nothing() {
        let input = flags(&[(0.0, false), (0.03, false), (0.06, false)]);
        assert!(group_raw(&input, 0.2, 0.09).is_empty());
    }

    #[test]
    fn test_multiple_runs() {
        let input = flags(&[
            (0.00, true),
            (0.03, false),
            (0.06, false),
            (0.09, true),
            (0.12, true),
            (0.15, false),
        ]);
        let segments = group_raw(&input, 0.1, 0.18);

        assert_eq!(segments.len(), 2);
        assert!((segments[0].end - 0.1).abs() < 1e-9);
        assert!((segments[1].start - 0.09).abs() < 1e-9);
        assert!((segments[1].end - 0.22).abs() < 1e-9);
    }

    #[test]
    fn test_merge_within_gap() {
        let raw = vec![SpeechSegment::new(1.0, 1.5), SpeechSegment::new(1.6, 2.0)];
        let merged = merge_close(raw, 0.3);

        assert_eq!(merged, vec![SpeechSegment::new(1.0, 2.0)]);
    }

    #[test]
    fn test_no_merge_beyond_gap() {
        let raw = vec![SpeechSegment::new(1.0, 1.5), SpeechSegment::new(1.6, 2.0)];
        let merged = merge_close(raw, 0.05);

        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_exact_gap_does_not_merge() {
        // Gap is exactly 0.1: strict less-than, so the segments stay apart.
        let raw = vec![SpeechSegment::new(1.0, 1.5), SpeechSegment::new(1.6, 2.0)];
        let merged = merge_close(raw, 0.1);

        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_merge_empty_input() {
        assert!(merge_close(Vec::new(), 0.3).is_empty());
    }

    #[test]
    fn test_merge_chain() {
        let raw = vec![
            SpeechSegment::new(0.0, 1.0),
            SpeechSegment::new(1.1, 2.0),
            SpeechSegment::new(2.1, 3.0),
            SpeechSegment::new(4.0, 5.0),
        ];
        let merged = merge_close(raw, 0.3);

        assert_eq!(
            merged,
            vec![SpeechSegment::new(0.0, 3.0), SpeechSegment::new(4.0, 5.0)]
        );
    }

    #[test]
    fn test_merge_idempotent() {
        let raw = vec![
            SpeechSegment::new(0.0, 1.0),
            SpeechSegment::new(1.1, 2.0),
            SpeechSegment::new(3.0, 4.0),
        ];
        let once = merge_close(raw, 0.3);
        let twice = merge_close(once.clone(), 0.3);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_merged_output_never_overlaps() {
        let raw = vec![
            SpeechSegment::new(0.0, 0.5),
            SpeechSegment::new(0.9, 1.2),
            SpeechSegment::new(1.25, 2.0),
            SpeechSegment::new(5.0, 6.0),
        ];
        let merged = merge_close(raw, 0.2);

        for pair in merged.windows(2) {
            assert!(pair[1].start >= pair[0].end);
        }
    }

    #[test]
    fn test_segment_stats() {
        let segments = vec![SpeechSegment::new(0.0, 1.0), SpeechSegment::new(2.0, 3.0)];
        let stats = segment_stats(&segments, 4.0);

        assert!((stats.speech_secs - 2.0).abs() < 1e-9);
        assert_eq!(stats.segment_count, 2);
        assert!((stats.speech_ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_segment_stats_empty_signal() {
        let stats = segment_stats(&[], 0.0);
        assert_eq!(stats.segment_count, 0);
        assert_eq!(stats.speech_ratio, 0.0);
    }
}
